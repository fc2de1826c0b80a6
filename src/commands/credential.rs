use anyhow::Result;

use crate::commands::{CommandReport, load_context};
use crate::rx::credential::{CredentialStore, CredentialStoreError, fingerprint};
use crate::rx::locale::locale;

pub fn set(key: &str) -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("credential-set");
    let store = CredentialStore::new(&ctx.paths.credential_file);

    match store.save(key) {
        Ok(()) => {
            report.detail(format!("credential_file={}", store.path().display()));
            report.detail(format!("fingerprint={}", fingerprint(key.trim())));
        }
        Err(err) if err.downcast_ref::<CredentialStoreError>().is_some() => {
            report.issue(locale(ctx.config.language()).messages.api_key_empty);
        }
        Err(err) => return Err(err),
    }
    Ok(report)
}

pub fn clear() -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("credential-clear");
    let store = CredentialStore::new(&ctx.paths.credential_file);

    if store.clear()? {
        report.detail("stored credential removed");
    } else {
        report.detail("no stored credential");
    }
    Ok(report)
}

pub fn status() -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("credential-status");
    let store = CredentialStore::new(&ctx.paths.credential_file);

    report.detail(format!("credential_file={}", store.path().display()));
    match store.resolve()? {
        Some(credential) => {
            report.detail("configured=true");
            report.detail(format!("source={}", credential.source.label()));
            report.detail(format!("fingerprint={}", credential.fingerprint()));
        }
        None => {
            report.detail("configured=false");
            report.issue(locale(ctx.config.language()).messages.api_key_not_set);
        }
    }
    Ok(report)
}
