use crate::rx::locale::Locale;
use crate::rx::model::AnalysisResult;
use crate::rx::risk::{RiskCategory, collect_high_risk};
use crate::rx::util::wrap_text;
use anyhow::{Result, anyhow};
use printpdf::*;
use regex::Regex;
use std::io::BufWriter;
use std::sync::LazyLock;

const BOM: char = '\u{FEFF}';

/// End of the critical summary: a numbered `### n.` heading or a rule.
static SECTION_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"### \d\.|\n---").expect("section break pattern compiles"));

fn csv_field(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    format!("\"{}\"", normalized.replace('"', "\"\""))
}

fn csv_row(fields: [&str; 7]) -> String {
    fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",")
}

/// Spreadsheet export: BOM, localized header, one fully quoted row per record.
pub fn to_csv(result: &AnalysisResult, locale: &Locale) -> String {
    let labels = &locale.labels;
    let mut rows = vec![labels.csv_headers.join(",")];

    for item in &result.drug_drug_interactions {
        let mut parts = item.interaction.split(" + ");
        let primary = parts.next().unwrap_or("");
        let secondary = parts.next().unwrap_or("");
        rows.push(csv_row([
            labels.drug_drug,
            primary,
            secondary,
            &item.risk_level,
            &item.potential_effects,
            &item.recommendations,
            &item.references,
        ]));
    }
    for item in &result.drug_substance_interactions {
        rows.push(csv_row([
            labels.drug_substance,
            &item.medication,
            &item.substance,
            &item.risk_level,
            &item.potential_effects,
            &item.recommendations,
            &item.references,
        ]));
    }
    for item in &result.drug_condition_contraindications {
        rows.push(csv_row([
            labels.drug_condition,
            &item.medication,
            &item.condition,
            &item.risk_level,
            &item.contraindication_details,
            &item.recommendations,
            &item.references,
        ]));
    }
    for item in &result.drug_pharmacogenetic_contraindications {
        rows.push(csv_row([
            labels.drug_pharmacogenetic,
            &item.medication,
            &item.genetic_factor,
            &item.risk_level,
            &item.implication,
            &item.recommendations,
            &item.references,
        ]));
    }
    for item in &result.beers_criteria_alerts {
        rows.push(csv_row([
            labels.beers_criteria,
            &item.medication,
            &item.criteria,
            &item.risk_level,
            labels.csv_na,
            &item.recommendations,
            &item.references,
        ]));
    }

    format!("{BOM}{}", rows.join("\n"))
}

/// Text under the critical summary heading, with bold markers removed.
/// Without the heading, everything before the first numbered section.
pub fn critical_summary(analysis_text: &str, locale: &Locale) -> String {
    let heading = format!("### {}", locale.prompt.critical_summary_title);
    let summary = match analysis_text.find(&heading) {
        Some(pos) => {
            let rest = &analysis_text[pos + heading.len()..];
            let end = SECTION_BREAK.find(rest).map_or(rest.len(), |m| m.start());
            rest[..end].trim()
        }
        None => {
            let end = SECTION_BREAK
                .find(analysis_text)
                .map_or(analysis_text.len(), |m| m.start());
            &analysis_text[..end]
        }
    };
    summary.replace("**", "")
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 18.0;
const LEFT: f32 = 20.0;

/// Cursor over a growing A4 document; starts a new page when the next line
/// would cross the bottom margin.
struct PdfCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfCursor {
    fn new(title: &str) -> Result<Self> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("PDF font error: {e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("PDF font error: {e}"))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: TOP,
        })
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed >= BOTTOM {
            return;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn line(&mut self, text: &str, size: f32, indent: f32, bold: bool) {
        let step = size * 0.5;
        self.ensure_space(step);
        let font = if bold { &self.bold } else { &self.font };
        self.layer
            .use_text(text, size, Mm(LEFT + indent), Mm(self.y), font);
        self.y -= step;
    }

    /// Word-wrapped paragraph; explicit newlines start new lines.
    fn paragraph(&mut self, text: &str, size: f32, indent: f32, bold: bool) {
        let max_chars = if size >= 12.0 { 70 } else { 95 };
        let max_chars = max_chars - (indent as usize / 2);
        for raw_line in text.lines() {
            if raw_line.trim().is_empty() {
                self.gap(1.5);
                continue;
            }
            for line in wrap_text(raw_line, max_chars) {
                self.line(&line, size, indent, bold);
            }
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn field(&mut self, label: &str, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.paragraph(&format!("{label}: {value}"), 9.0, 5.0, false);
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| anyhow!("PDF save error: {e}"))?;
        buf.into_inner()
            .map_err(|e| anyhow!("PDF buffer error: {e}"))
    }
}

/// Paginated A4 report mirroring the on-screen sections.
pub fn to_pdf(result: &AnalysisResult, locale: &Locale) -> Result<Vec<u8>> {
    let labels = &locale.labels;
    let mut pdf = PdfCursor::new(labels.results_title)?;

    pdf.line(labels.results_title, 16.0, 0.0, true);
    pdf.gap(4.0);

    let high_risk = collect_high_risk(result, locale);
    if !high_risk.is_empty() {
        pdf.line(labels.high_risk_title, 13.0, 0.0, true);
        pdf.paragraph(labels.high_risk_intro, 10.0, 0.0, false);
        for item in &high_risk {
            pdf.paragraph(
                &format!("- {}: {}", item.category.label(locale), item.description),
                10.0,
                3.0,
                false,
            );
        }
        pdf.gap(4.0);
    }

    pdf.line(locale.prompt.critical_summary_title, 14.0, 0.0, true);
    pdf.paragraph(&critical_summary(&result.analysis_text, locale), 10.0, 0.0, false);
    pdf.gap(4.0);

    for category in RiskCategory::ALL {
        write_category(&mut pdf, result, category, locale);
    }

    if !result.sources.is_empty() {
        pdf.line(labels.section_sources, 13.0, 0.0, true);
        for (idx, source) in result.sources.iter().enumerate() {
            pdf.paragraph(&format!("{}. {}", idx + 1, source.title), 10.0, 0.0, true);
            pdf.paragraph(&source.uri, 9.0, 5.0, false);
            if let Some(summary) = source.summary.as_deref() {
                pdf.paragraph(summary, 9.0, 5.0, false);
            }
            pdf.gap(1.5);
        }
    }

    pdf.finish()
}

fn write_category(pdf: &mut PdfCursor, result: &AnalysisResult, category: RiskCategory, locale: &Locale) {
    let l = &locale.labels;
    let count = match category {
        RiskCategory::DrugDrug => result.drug_drug_interactions.len(),
        RiskCategory::DrugSubstance => result.drug_substance_interactions.len(),
        RiskCategory::DrugCondition => result.drug_condition_contraindications.len(),
        RiskCategory::DrugPharmacogenetic => result.drug_pharmacogenetic_contraindications.len(),
        RiskCategory::BeersCriteria => result.beers_criteria_alerts.len(),
    };
    if count == 0 {
        return;
    }
    pdf.line(
        &format!("{} ({count})", category.section_title(locale)),
        13.0,
        0.0,
        true,
    );

    match category {
        RiskCategory::DrugDrug => {
            for i in &result.drug_drug_interactions {
                pdf.paragraph(&i.interaction, 10.0, 0.0, true);
                pdf.field(l.risk_level, &i.risk_level);
                pdf.field(l.potential_effects, &i.potential_effects);
                pdf.field(l.recommendations, &i.recommendations);
                pdf.field(l.references, &i.references);
                pdf.gap(2.0);
            }
        }
        RiskCategory::DrugSubstance => {
            for i in &result.drug_substance_interactions {
                pdf.paragraph(&format!("{} + {}", i.medication, i.substance), 10.0, 0.0, true);
                pdf.field(l.risk_level, &i.risk_level);
                pdf.field(l.potential_effects, &i.potential_effects);
                pdf.field(l.recommendations, &i.recommendations);
                pdf.field(l.references, &i.references);
                pdf.gap(2.0);
            }
        }
        RiskCategory::DrugCondition => {
            for i in &result.drug_condition_contraindications {
                pdf.paragraph(
                    &format!("{} {} {}", i.medication, l.with, i.condition),
                    10.0,
                    0.0,
                    true,
                );
                pdf.field(l.risk_level, &i.risk_level);
                pdf.field(l.details, &i.contraindication_details);
                pdf.field(l.recommendations, &i.recommendations);
                pdf.field(l.references, &i.references);
                pdf.gap(2.0);
            }
        }
        RiskCategory::DrugPharmacogenetic => {
            for i in &result.drug_pharmacogenetic_contraindications {
                pdf.paragraph(&format!("{} ({})", i.medication, i.genetic_factor), 10.0, 0.0, true);
                pdf.field(l.risk_level, &i.risk_level);
                pdf.field(l.implication, &i.implication);
                pdf.field(l.recommendations, &i.recommendations);
                pdf.field(l.references, &i.references);
                pdf.gap(2.0);
            }
        }
        RiskCategory::BeersCriteria => {
            for i in &result.beers_criteria_alerts {
                pdf.paragraph(&i.medication, 10.0, 0.0, true);
                pdf.field(l.criteria_reason, &i.criteria);
                pdf.field(l.risk_level, &i.risk_level);
                pdf.field(l.recommendations, &i.recommendations);
                pdf.field(l.references, &i.references);
                pdf.gap(2.0);
            }
        }
    }
    pdf.gap(3.0);
}
