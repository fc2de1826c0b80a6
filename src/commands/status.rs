use anyhow::Result;
use std::env;

use crate::commands::{CommandReport, load_context};
use crate::rx::credential::CredentialStore;
use crate::rx::history::HistoryStore;

include!(concat!(env!("OUT_DIR"), "/env_keys.rs"));

pub fn run() -> Result<CommandReport> {
    let ctx = load_context()?;
    let paths = &ctx.paths;
    let cfg = &ctx.config;
    let mut report = CommandReport::new("status");

    report.detail(format!("build={}", env!("BUILD_ID")));
    report.detail(format!("rx_home={}", paths.rx_home.display()));
    report.detail(format!("config_file={}", paths.config_file.display()));
    report.detail(format!("credential_file={}", paths.credential_file.display()));
    report.detail(format!("history_file={}", paths.history_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));

    report.detail(format!("model={}", cfg.remote.model));
    report.detail(format!("api_base={}", cfg.remote.api_base));
    report.detail(format!("web_search={}", cfg.remote.web_search));
    report.detail(format!(
        "request_timeout_secs={}",
        cfg.remote.request_timeout_secs
    ));
    report.detail(format!("language={}", cfg.language().code()));

    match CredentialStore::new(&paths.credential_file).resolve()? {
        Some(credential) => report.detail(format!(
            "credential=configured ({})",
            credential.source.label()
        )),
        None => report.issue("credential not configured; run `rxcheck credential set <KEY>`"),
    }

    let history = HistoryStore::open(&paths.history_file);
    report.detail(format!("history_items={}", history.items().len()));

    for key in ENV_KEYS {
        if env::var_os(key).is_some() {
            report.detail(format!("env {key} is set"));
        }
    }

    Ok(report)
}
