use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::{CommandReport, load_context};
use crate::rx::audit;
use crate::rx::export::{to_csv, to_pdf};
use crate::rx::locale::{Locale, locale};
use crate::rx::model::AnalysisResult;

#[derive(Debug, Clone, Default)]
pub struct ExportTargets {
    pub csv: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

impl ExportTargets {
    pub fn is_empty(&self) -> bool {
        self.csv.is_none() && self.pdf.is_none()
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Write each requested export; failures become report issues.
pub fn write_exports(
    result: &AnalysisResult,
    texts: &Locale,
    targets: &ExportTargets,
    report: &mut CommandReport,
) {
    if let Some(path) = targets.csv.as_deref() {
        match write_file(path, to_csv(result, texts).as_bytes()) {
            Ok(()) => report.detail(format!("csv={}", path.display())),
            Err(err) => report.issue(format!("csv export failed: {err:#}")),
        }
    }
    if let Some(path) = targets.pdf.as_deref() {
        match to_pdf(result, texts).and_then(|bytes| write_file(path, &bytes)) {
            Ok(()) => report.detail(format!("pdf={}", path.display())),
            Err(err) => report.issue(format!("pdf export failed: {err:#}")),
        }
    }
}

pub fn run(id: &str, targets: &ExportTargets) -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("export");

    if targets.is_empty() {
        report.issue("nothing to export: pass --csv and/or --pdf");
        return Ok(report);
    }

    let mut session = ctx.offline_session();
    if !session.load_history(id) {
        report.issue(format!("no history item with id `{id}`"));
        return Ok(report);
    }
    let Some(result) = session.result() else {
        return Ok(report);
    };

    report.detail(format!("id={id}"));
    write_exports(result, locale(session.inputs.language), targets, &mut report);
    let status = if report.ok { "ok" } else { "failed" };
    audit::record(&ctx.paths, "export", status, id);
    Ok(report)
}
