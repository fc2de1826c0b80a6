use anyhow::Result;

use crate::commands::export::{ExportTargets, write_exports};
use crate::commands::{CommandReport, load_context};
use crate::rx::audit;
use crate::rx::client::{AnalysisClient, AnalysisError, GeminiBackend};
use crate::rx::credential::CredentialStore;
use crate::rx::history::{HistoryStore, PersistOutcome};
use crate::rx::locale::locale;
use crate::rx::model::{AnalysisInputs, Language};
use crate::rx::render::render_text;
use crate::rx::risk::collect_high_risk;
use crate::rx::session::{AnalysisSession, SessionError};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Start from a saved analysis instead of an empty regimen.
    pub from: Option<String>,
    pub medications: Vec<String>,
    pub drop: Vec<String>,
    pub conditions: Option<String>,
    pub substances: Option<String>,
    pub pharmacogenetics: Option<String>,
    pub date_of_birth: Option<String>,
    pub language: Option<Language>,
    pub exports: ExportTargets,
}

pub fn run(opts: &AnalyzeOptions) -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("analyze");

    let credentials = CredentialStore::new(&ctx.paths.credential_file);
    let backend = credentials
        .resolve()?
        .map(|credential| GeminiBackend::new(credential.key, &ctx.config.remote));
    let client = AnalysisClient::new(backend, &ctx.config.remote);
    let history = HistoryStore::open(&ctx.paths.history_file);
    let language = opts.language.unwrap_or_else(|| ctx.config.language());
    let mut session = AnalysisSession::new(AnalysisInputs::new(language), client, history);

    if let Some(id) = opts.from.as_deref() {
        if !session.load_history(id) {
            report.issue(format!("no history item with id `{id}`"));
            return Ok(report);
        }
        if let Some(language) = opts.language {
            session.inputs.language = language;
        }
        report.detail(format!("from={id}"));
    }

    apply_edits(&mut session.inputs, opts, &mut report);
    if !report.ok {
        return Ok(report);
    }
    let texts = locale(session.inputs.language);

    match session.analyze() {
        Ok(result) => {
            let result = result.clone();
            report.body(render_text(&result, texts));
            report.detail(format!("records={}", result.record_count()));
            report.detail(format!(
                "high_risk={}",
                collect_high_risk(&result, texts).len()
            ));
            report.detail(format!("sources={}", result.sources.len()));
            if let Some(item) = session.history().items().first() {
                report.detail(format!("id={}", item.id));
                audit::record(&ctx.paths, "analyze", "ok", &item.id);
            }
            if let Some(PersistOutcome::Failed(err)) = session.last_persist() {
                report.detail(format!("history not saved: {err:#}"));
            }
            write_exports(&result, texts, &opts.exports, &mut report);
        }
        Err(err) => {
            let message = session
                .error()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            report.issue(message);
            if err == SessionError::Analysis(AnalysisError::InvalidCredential) {
                match credentials.clear() {
                    Ok(true) => report.detail("stored credential cleared; set a new one with `rxcheck credential set`"),
                    Ok(false) => {}
                    Err(clear_err) => report.issue(format!("failed to clear credential: {clear_err:#}")),
                }
            }
            audit::record(&ctx.paths, "analyze", "failed", &err.to_string());
        }
    }

    Ok(report)
}

fn apply_edits(inputs: &mut AnalysisInputs, opts: &AnalyzeOptions, report: &mut CommandReport) {
    let texts = locale(inputs.language);
    for medication in &opts.drop {
        if !inputs.remove_medication(medication.trim()) {
            report.issue(format!("medication `{medication}` is not in the saved regimen"));
        }
    }
    for medication in &opts.medications {
        if let Err(err) = inputs.add_medication(medication) {
            report.issue(format!("{}: {medication}", err.user_message(texts)));
        }
    }
    if let Some(conditions) = &opts.conditions {
        inputs.conditions = conditions.clone();
    }
    if let Some(substances) = &opts.substances {
        inputs.other_substances = substances.clone();
    }
    if let Some(pharmacogenetics) = &opts.pharmacogenetics {
        inputs.pharmacogenetics = pharmacogenetics.clone();
    }
    if let Some(date_of_birth) = &opts.date_of_birth {
        inputs.date_of_birth = date_of_birth.clone();
    }
}
