pub mod analyze;
pub mod credential;
pub mod export;
pub mod history;
pub mod status;

use crate::rx::client::{AnalysisClient, GeminiBackend};
use crate::rx::config::{RxConfig, load_config};
use crate::rx::history::HistoryStore;
use crate::rx::model::AnalysisInputs;
use crate::rx::paths::{RxPaths, resolve_paths};
use crate::rx::session::AnalysisSession;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    /// Rendered document printed before the details (analysis text, history item).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            body: None,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn body(&mut self, text: impl Into<String>) {
        self.body = Some(text.into());
    }
}

/// Paths and config every command starts from.
pub struct Context {
    pub paths: RxPaths,
    pub config: RxConfig,
}

impl Context {
    /// Session over saved analyses only. It has no backend, so it never
    /// reaches the remote service.
    pub fn offline_session(&self) -> AnalysisSession<GeminiBackend> {
        let client = AnalysisClient::new(None, &self.config.remote);
        let history = HistoryStore::open(&self.paths.history_file);
        AnalysisSession::new(AnalysisInputs::new(self.config.language()), client, history)
    }
}

pub fn load_context() -> Result<Context> {
    let paths = resolve_paths()?;
    let config = load_config(&paths.config_file)?;
    Ok(Context { paths, config })
}
