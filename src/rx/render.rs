use crate::rx::locale::Locale;
use crate::rx::model::AnalysisResult;
use crate::rx::risk::{RiskCategory, collect_high_risk};
use std::fmt::Write;

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

fn field(out: &mut String, label: &str, value: &str) {
    if !value.trim().is_empty() {
        let _ = writeln!(out, "    {label}: {value}");
    }
}

/// Plain-text rendering for terminals.
pub fn render_text(result: &AnalysisResult, locale: &Locale) -> String {
    let l = &locale.labels;
    let mut out = String::new();

    let high_risk = collect_high_risk(result, locale);
    if !high_risk.is_empty() {
        heading(&mut out, &format!("!! {}", l.high_risk_title));
        let _ = writeln!(out, "{}", l.high_risk_intro);
        for item in &high_risk {
            let _ = writeln!(out, "  - [{}] {}", item.category.label(locale), item.description);
        }
        out.push('\n');
    }

    heading(&mut out, l.results_title);
    if !result.analysis_text.is_empty() {
        let _ = writeln!(out, "{}", result.analysis_text);
    }

    for category in RiskCategory::ALL {
        render_category(&mut out, result, category, locale);
    }

    if !result.sources.is_empty() {
        out.push('\n');
        heading(&mut out, &format!("{} ({})", l.section_sources, result.sources.len()));
        for (idx, source) in result.sources.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", idx + 1, source.title);
            let _ = writeln!(out, "    {}", source.uri);
            if let Some(summary) = source.summary.as_deref() {
                let _ = writeln!(out, "    {summary}");
            }
        }
    }

    out
}

fn render_category(out: &mut String, result: &AnalysisResult, category: RiskCategory, locale: &Locale) {
    let l = &locale.labels;
    let mut entries: Vec<(String, Vec<(&str, &str)>)> = Vec::new();

    match category {
        RiskCategory::DrugDrug => {
            for i in &result.drug_drug_interactions {
                entries.push((
                    i.interaction.clone(),
                    vec![
                        (l.risk_level, i.risk_level.as_str()),
                        (l.potential_effects, i.potential_effects.as_str()),
                        (l.recommendations, i.recommendations.as_str()),
                        (l.references, i.references.as_str()),
                    ],
                ));
            }
        }
        RiskCategory::DrugSubstance => {
            for i in &result.drug_substance_interactions {
                entries.push((
                    format!("{} + {}", i.medication, i.substance),
                    vec![
                        (l.risk_level, i.risk_level.as_str()),
                        (l.potential_effects, i.potential_effects.as_str()),
                        (l.recommendations, i.recommendations.as_str()),
                        (l.references, i.references.as_str()),
                    ],
                ));
            }
        }
        RiskCategory::DrugCondition => {
            for i in &result.drug_condition_contraindications {
                entries.push((
                    format!("{} {} {}", i.medication, l.with, i.condition),
                    vec![
                        (l.risk_level, i.risk_level.as_str()),
                        (l.details, i.contraindication_details.as_str()),
                        (l.recommendations, i.recommendations.as_str()),
                        (l.references, i.references.as_str()),
                    ],
                ));
            }
        }
        RiskCategory::DrugPharmacogenetic => {
            for i in &result.drug_pharmacogenetic_contraindications {
                entries.push((
                    format!("{} ({})", i.medication, i.genetic_factor),
                    vec![
                        (l.risk_level, i.risk_level.as_str()),
                        (l.implication, i.implication.as_str()),
                        (l.recommendations, i.recommendations.as_str()),
                        (l.references, i.references.as_str()),
                    ],
                ));
            }
        }
        RiskCategory::BeersCriteria => {
            for i in &result.beers_criteria_alerts {
                entries.push((
                    i.medication.clone(),
                    vec![
                        (l.criteria_reason, i.criteria.as_str()),
                        (l.risk_level, i.risk_level.as_str()),
                        (l.recommendations, i.recommendations.as_str()),
                        (l.references, i.references.as_str()),
                    ],
                ));
            }
        }
    }

    if entries.is_empty() {
        return;
    }
    out.push('\n');
    heading(
        out,
        &format!("{} ({})", category.section_title(locale), entries.len()),
    );
    for (title, fields) in entries {
        let _ = writeln!(out, "  * {title}");
        for (label, value) in fields {
            field(out, label, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rx::locale::locale;
    use crate::rx::model::{DrugConditionContraindication, DrugDrugInteraction, Language, Source};

    #[test]
    fn renders_alert_sections_and_sources() {
        let result = AnalysisResult {
            analysis_text: "Narrative".to_string(),
            sources: vec![Source {
                uri: "https://a.example".to_string(),
                title: "A".to_string(),
                summary: None,
                preview: None,
            }],
            drug_drug_interactions: vec![DrugDrugInteraction {
                interaction: "Warfarin + Aspirin".to_string(),
                risk_level: "High".to_string(),
                ..Default::default()
            }],
            drug_condition_contraindications: vec![DrugConditionContraindication {
                medication: "Ibuprofen".to_string(),
                condition: "CKD".to_string(),
                risk_level: "Moderate".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let text = render_text(&result, locale(Language::En));
        assert!(text.starts_with("!! High-Risk Alert"));
        assert!(text.contains("[Drug-Drug Interaction] Warfarin + Aspirin"));
        assert!(text.contains("Narrative"));
        assert!(text.contains("Drug-Drug Interactions (1)"));
        assert!(text.contains("  * Ibuprofen with CKD"));
        assert!(text.contains("    Risk level: Moderate"));
        assert!(!text.contains("Beers Criteria Alerts"));
        assert!(text.contains("1. A\n    https://a.example"));
    }

    #[test]
    fn no_alert_without_high_risk() {
        let text = render_text(&AnalysisResult::default(), locale(Language::Es));
        assert!(!text.contains("Alerta"));
        assert!(text.starts_with("Análisis de Interacciones"));
    }
}
