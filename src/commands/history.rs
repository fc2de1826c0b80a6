use anyhow::Result;

use crate::commands::{CommandReport, load_context};
use crate::rx::audit;
use crate::rx::locale::locale;
use crate::rx::render::render_text;
use crate::rx::util::truncate_with_ellipsis;

pub fn list() -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("history-list");
    let session = ctx.offline_session();
    let items = session.history().items();

    if items.is_empty() {
        report.detail(locale(ctx.config.language()).labels.history_empty);
        return Ok(report);
    }
    for item in items {
        let medications = truncate_with_ellipsis(&item.inputs.medications.join(", "), 60);
        report.detail(format!(
            "{}  {}  [{}]  {}  records={}",
            item.id,
            item.timestamp,
            item.language().code(),
            medications,
            item.result().record_count()
        ));
    }
    Ok(report)
}

pub fn show(id: &str) -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("history-show");
    let mut session = ctx.offline_session();

    if !session.load_history(id) {
        report.issue(format!("no history item with id `{id}`"));
        return Ok(report);
    }

    report.detail(format!("id={id}"));
    if let Some(item) = session.history().find_by_id(id) {
        report.detail(format!("timestamp={}", item.timestamp));
    }
    let inputs = &session.inputs;
    report.detail(format!("medications={}", inputs.medications.join(", ")));
    report.detail(format!("conditions={}", inputs.conditions));
    if !inputs.other_substances.is_empty() {
        report.detail(format!("substances={}", inputs.other_substances));
    }
    if !inputs.pharmacogenetics.is_empty() {
        report.detail(format!("pharmacogenetics={}", inputs.pharmacogenetics));
    }
    if !inputs.date_of_birth.is_empty() {
        report.detail(format!("dob={}", inputs.date_of_birth));
    }
    if let Some(result) = session.result() {
        report.body(render_text(result, locale(inputs.language)));
    }
    Ok(report)
}

pub fn clear() -> Result<CommandReport> {
    let ctx = load_context()?;
    let mut report = CommandReport::new("history-clear");
    let mut session = ctx.offline_session();
    let count = session.history().items().len();

    session.clear_history()?;
    report.detail(format!("removed={count}"));
    audit::record(&ctx.paths, "history-clear", "ok", &format!("removed {count} items"));
    Ok(report)
}
