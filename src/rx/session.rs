use crate::rx::client::{AnalysisClient, AnalysisError, GenerativeBackend};
use crate::rx::history::{HistoryStore, PersistOutcome};
use crate::rx::locale::locale;
use crate::rx::model::{AnalysisInputs, AnalysisResult, HistoryItem, InputError};
use anyhow::Result;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// One analysis workflow: the inputs being edited, the last outcome and the
/// history it feeds.
pub struct AnalysisSession<B> {
    pub inputs: AnalysisInputs,
    result: Option<AnalysisResult>,
    error: Option<String>,
    loading: bool,
    last_persist: Option<PersistOutcome>,
    client: AnalysisClient<B>,
    history: HistoryStore,
}

impl<B: GenerativeBackend> AnalysisSession<B> {
    pub fn new(inputs: AnalysisInputs, client: AnalysisClient<B>, history: HistoryStore) -> Self {
        Self {
            inputs,
            result: None,
            error: None,
            loading: false,
            last_persist: None,
            client,
            history,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Outcome of the most recent history write, if any.
    pub fn last_persist(&self) -> Option<&PersistOutcome> {
        self.last_persist.as_ref()
    }

    pub fn analyze(&mut self) -> Result<&AnalysisResult, SessionError> {
        let texts = locale(self.inputs.language);
        if let Err(err) = self.inputs.validate() {
            self.error = Some(err.user_message(texts).to_string());
            return Err(err.into());
        }

        self.loading = true;
        self.error = None;
        self.result = None;
        tracing::debug!(
            loading = self.loading,
            medications = self.inputs.medications.len(),
            "analysis started"
        );

        let outcome = self.client.analyze(&self.inputs);
        self.loading = false;

        match outcome {
            Ok(result) => {
                let item = HistoryItem::new(self.inputs.clone(), result.clone());
                self.last_persist = Some(self.history.append(item));
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                self.error = Some(err.user_message(texts).to_string());
                Err(err.into())
            }
        }
    }

    /// Restore a saved analysis. Returns false when `id` is unknown.
    pub fn load_history(&mut self, id: &str) -> bool {
        let Some(item) = self.history.find_by_id(id) else {
            return false;
        };
        self.inputs = item.inputs.clone();
        self.result = Some(item.result());
        self.error = None;
        true
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }
}
