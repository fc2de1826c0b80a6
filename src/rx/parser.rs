use crate::rx::locale::locale;
use crate::rx::model::{
    AnalysisResult, GroundingSource, Language, PartialAnalysisResult, Source,
};
use crate::rx::normalize::normalize;
use crate::rx::prompt::{
    INTERACTION_DATA_END, INTERACTION_DATA_START, SOURCE_END, SOURCE_START, sources_heading,
};
use regex::Regex;
use std::sync::LazyLock;

/// Fields of one source block, in fixed order. Values may span lines.
static SOURCE_FIELDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*URI:(.*?)\s*TITLE:(.*?)\s*SUMMARY:(.*?)\s*PREVIEW:(.*?)\s*$")
        .expect("source field pattern compiles")
});

/// Turns a raw model answer into a typed analysis.
///
/// Callers only see this trait, so the sentinel text protocol can be replaced
/// by a schema-constrained output mode without touching them.
pub trait ResponseParser {
    fn parse(&self, raw: &str, grounding: &[GroundingSource]) -> AnalysisResult;
}

/// Parser for the `[INTERACTION_DATA_*]` / `[SOURCE_*]` marker protocol.
#[derive(Debug, Clone)]
pub struct SentinelParser {
    sources_heading: String,
}

impl SentinelParser {
    pub fn new(sources_heading: impl Into<String>) -> Self {
        Self {
            sources_heading: sources_heading.into(),
        }
    }

    pub fn for_language(language: Language) -> Self {
        Self::new(sources_heading(locale(language)))
    }
}

impl ResponseParser for SentinelParser {
    fn parse(&self, raw: &str, grounding: &[GroundingSource]) -> AnalysisResult {
        let (structured, display_text) = split_structured_block(raw);

        let mut parts = display_text.split(self.sources_heading.as_str());
        let analysis_text = parts.next().unwrap_or("").trim().to_string();
        let sources_text = parts.next().unwrap_or("");

        let mut sources = if sources_text.is_empty() {
            Vec::new()
        } else {
            extract_source_blocks(sources_text)
        };
        if sources.is_empty() {
            sources = sources_from_grounding(grounding);
        }

        AnalysisResult {
            analysis_text,
            sources,
            ..normalize(structured)
        }
    }
}

/// Split off the marker-delimited JSON block.
///
/// Only the first START and first END are considered, and only when START
/// comes first. A malformed block still consumes the text up to END.
fn split_structured_block(raw: &str) -> (PartialAnalysisResult, &str) {
    let (Some(start), Some(end)) = (raw.find(INTERACTION_DATA_START), raw.find(INTERACTION_DATA_END))
    else {
        return (PartialAnalysisResult::default(), raw);
    };
    let body_start = start + INTERACTION_DATA_START.len();
    if body_start > end {
        return (PartialAnalysisResult::default(), raw);
    }

    let body = raw[body_start..end].trim();
    let display = raw[end + INTERACTION_DATA_END.len()..].trim();

    match serde_json::from_str::<PartialAnalysisResult>(body) {
        Ok(parsed) => (structured_categories_only(parsed), display),
        Err(err) => {
            tracing::warn!(
                error = %err,
                block_chars = body.chars().count(),
                "failed to parse structured interaction data; continuing with empty categories"
            );
            (PartialAnalysisResult::default(), display)
        }
    }
}

fn structured_categories_only(parsed: PartialAnalysisResult) -> PartialAnalysisResult {
    PartialAnalysisResult {
        analysis_text: String::new(),
        sources: Vec::new(),
        ..parsed
    }
}

/// Collect `[SOURCE_START] … [SOURCE_END]` blocks in document order.
///
/// Each block is matched on its own slice, so a malformed block yields
/// nothing rather than borrowing labels from the block after it.
fn extract_source_blocks(text: &str) -> Vec<Source> {
    let mut out = Vec::new();
    for segment in text.split(SOURCE_START).skip(1) {
        let Some((body, _)) = segment.split_once(SOURCE_END) else {
            continue;
        };
        let Some(caps) = SOURCE_FIELDS.captures(body) else {
            continue;
        };
        let field = |idx: usize| {
            caps.get(idx)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };
        let non_empty = |value: String| (!value.is_empty()).then_some(value);

        out.push(Source {
            uri: field(1),
            title: field(2),
            summary: non_empty(field(3)),
            preview: non_empty(field(4)),
        });
    }
    out
}

fn sources_from_grounding(grounding: &[GroundingSource]) -> Vec<Source> {
    grounding
        .iter()
        .filter_map(|chunk| {
            let uri = chunk.uri.as_deref().filter(|v| !v.is_empty())?;
            let title = chunk.title.as_deref().filter(|v| !v.is_empty())?;
            Some(Source {
                uri: uri.to_string(),
                title: title.to_string(),
                summary: None,
                preview: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADING: &str = "### Sources Summary";

    fn parser() -> SentinelParser {
        SentinelParser::new(HEADING)
    }

    fn grounding() -> Vec<GroundingSource> {
        vec![
            GroundingSource {
                uri: Some("https://grounded.example/a".to_string()),
                title: Some("Grounded A".to_string()),
            },
            GroundingSource {
                uri: Some("https://grounded.example/no-title".to_string()),
                title: None,
            },
            GroundingSource {
                uri: None,
                title: Some("No uri".to_string()),
            },
        ]
    }

    #[test]
    fn extracts_marked_json_and_keeps_text_after_end_marker() {
        let raw = r#"intro [INTERACTION_DATA_START] {"drugDrugInteractions":[{"interaction":"A+B","riskLevel":"High","potentialEffects":"x","recommendations":"y","references":"z"}]} [INTERACTION_DATA_END] outro"#;
        let result = parser().parse(raw, &[]);
        assert_eq!(result.drug_drug_interactions.len(), 1);
        assert_eq!(result.drug_drug_interactions[0].interaction, "A+B");
        assert_eq!(result.drug_drug_interactions[0].risk_level, "High");
        assert_eq!(result.analysis_text, "outro");
        assert!(result.drug_substance_interactions.is_empty());
        assert!(result.beers_criteria_alerts.is_empty());
    }

    #[test]
    fn structured_arrays_match_json_content_exactly() {
        let raw = r#"[INTERACTION_DATA_START]
{
  "drugDrugInteractions": [],
  "drugSubstanceInteractions": [{"medication":"Warfarin","substance":"Ginkgo","riskLevel":"Moderate","potentialEffects":"bleeding","recommendations":"avoid","references":"ref"}],
  "drugConditionContraindications": [{"medication":"Ibuprofen","condition":"CKD","riskLevel":"High","contraindicationDetails":"renal","recommendations":"avoid","references":"KDIGO"}],
  "drugPharmacogeneticContraindications": [{"medication":"Clopidogrel","geneticFactor":"CYP2C19*2","riskLevel":"High","implication":"reduced activation","recommendations":"switch","references":"CPIC"}],
  "beersCriteriaAlerts": [{"medication":"Diazepam","criteria":"benzodiazepine","riskLevel":"Moderate","recommendations":"taper","references":"AGS 2023"}]
}
[INTERACTION_DATA_END]
Narrative"#;
        let result = parser().parse(raw, &[]);
        assert!(result.drug_drug_interactions.is_empty());
        assert_eq!(result.drug_substance_interactions[0].substance, "Ginkgo");
        assert_eq!(result.drug_condition_contraindications[0].condition, "CKD");
        assert_eq!(
            result.drug_pharmacogenetic_contraindications[0].genetic_factor,
            "CYP2C19*2"
        );
        assert_eq!(result.beers_criteria_alerts[0].criteria, "benzodiazepine");
        assert_eq!(result.analysis_text, "Narrative");
    }

    #[test]
    fn missing_marker_keeps_full_text_and_empty_categories() {
        let raw = "[INTERACTION_DATA_START] {\"drugDrugInteractions\":[{\"interaction\":\"A+B\"}]}\nno end marker here";
        let result = parser().parse(raw, &[]);
        assert_eq!(result.record_count(), 0);
        assert_eq!(result.analysis_text, raw.trim());

        let plain = "  Just narrative text.  ";
        let result = parser().parse(plain, &[]);
        assert_eq!(result.analysis_text, "Just narrative text.");
        assert_eq!(result.record_count(), 0);
    }

    #[test]
    fn end_marker_before_start_is_treated_as_absent() {
        let raw = "[INTERACTION_DATA_END] {} [INTERACTION_DATA_START] tail";
        let result = parser().parse(raw, &[]);
        assert_eq!(result.analysis_text, raw);
        assert_eq!(result.record_count(), 0);
    }

    #[test]
    fn only_first_marker_pair_is_honored() {
        let raw = r#"[INTERACTION_DATA_START]{"beersCriteriaAlerts":[{"medication":"first"}]}[INTERACTION_DATA_END]
middle
[INTERACTION_DATA_START]{"beersCriteriaAlerts":[{"medication":"second"}]}[INTERACTION_DATA_END]"#;
        let result = parser().parse(raw, &[]);
        assert_eq!(result.beers_criteria_alerts.len(), 1);
        assert_eq!(result.beers_criteria_alerts[0].medication, "first");
        assert!(result.analysis_text.starts_with("middle"));
    }

    #[test]
    fn malformed_json_is_not_fatal() {
        let raw = "[INTERACTION_DATA_START] {\"drugDrugInteractions\": [ {oops ] [INTERACTION_DATA_END]\n## Summary\nStill shown.";
        let result = parser().parse(raw, &grounding());
        assert_eq!(result.record_count(), 0);
        assert_eq!(result.analysis_text, "## Summary\nStill shown.");
        assert_eq!(result.sources.len(), 1);
    }

    #[test]
    fn null_field_keeps_every_category() {
        let raw = r#"[INTERACTION_DATA_START]{"drugDrugInteractions":[{"interaction":"A+B","riskLevel":"High","references":null}],"beersCriteriaAlerts":[{"medication":"Diazepam","riskLevel":"High"}]}[INTERACTION_DATA_END]text"#;
        let result = parser().parse(raw, &[]);
        assert_eq!(result.drug_drug_interactions.len(), 1);
        assert_eq!(result.drug_drug_interactions[0].references, "");
        assert_eq!(result.beers_criteria_alerts.len(), 1);
        assert_eq!(result.beers_criteria_alerts[0].medication, "Diazepam");
    }

    #[test]
    fn list_and_number_fields_become_text() {
        let raw = r#"[INTERACTION_DATA_START]{"drugDrugInteractions":[{"interaction":"A+B","riskLevel":"High","references":["PMID 1","PMID 2"],"recommendations":3}]}[INTERACTION_DATA_END]"#;
        let result = parser().parse(raw, &[]);
        assert_eq!(result.drug_drug_interactions.len(), 1);
        let entry = &result.drug_drug_interactions[0];
        assert_eq!(entry.references, "PMID 1; PMID 2");
        assert_eq!(entry.recommendations, "3");
        assert_eq!(entry.risk_level, "High");
    }

    #[test]
    fn one_bad_entry_is_skipped_without_touching_other_categories() {
        let raw = r#"[INTERACTION_DATA_START]{
  "drugDrugInteractions": ["not a record", {"interaction":"Warfarin + Aspirin","riskLevel":"High"}],
  "drugSubstanceInteractions": {"medication":"oops"},
  "drugConditionContraindications": [{"medication":"Ibuprofen","condition":"CKD","riskLevel":"High"}]
}[INTERACTION_DATA_END]"#;
        let result = parser().parse(raw, &[]);
        assert_eq!(result.drug_drug_interactions.len(), 1);
        assert_eq!(
            result.drug_drug_interactions[0].interaction,
            "Warfarin + Aspirin"
        );
        assert!(result.drug_substance_interactions.is_empty());
        assert_eq!(result.drug_condition_contraindications.len(), 1);
    }

    #[test]
    fn two_source_blocks_are_returned_in_order_and_grounding_is_ignored() {
        let raw = "Analysis body.\n\n### Sources Summary\nSources used:\n[SOURCE_START]\nURI: https://a.example/1\nTITLE: First source\nSUMMARY: Supports the\nwarfarin finding.\nPREVIEW: \"Aspirin increases...\"\n[SOURCE_END]\n[SOURCE_START]\nURI: https://b.example/2\nTITLE: Second source\nSUMMARY: Second summary\nPREVIEW: Second preview\n[SOURCE_END]\n";
        let result = parser().parse(raw, &grounding());
        assert_eq!(result.analysis_text, "Analysis body.");
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].uri, "https://a.example/1");
        assert_eq!(result.sources[0].title, "First source");
        assert_eq!(
            result.sources[0].summary.as_deref(),
            Some("Supports the\nwarfarin finding.")
        );
        assert_eq!(
            result.sources[0].preview.as_deref(),
            Some("\"Aspirin increases...\"")
        );
        assert_eq!(result.sources[1].title, "Second source");
    }

    #[test]
    fn no_source_blocks_falls_back_to_grounding_with_uri_and_title() {
        let raw = "Body\n### Sources Summary\nI could not list sources.";
        let result = parser().parse(raw, &grounding());
        assert_eq!(result.analysis_text, "Body");
        assert_eq!(
            result.sources,
            vec![Source {
                uri: "https://grounded.example/a".to_string(),
                title: "Grounded A".to_string(),
                summary: None,
                preview: None,
            }]
        );

        let no_heading = parser().parse("Body only", &grounding());
        assert_eq!(no_heading.sources.len(), 1);
    }

    #[test]
    fn malformed_block_does_not_borrow_fields_from_the_next_block() {
        let raw = "x\n### Sources Summary\n[SOURCE_START]\nTITLE: reordered\nURI: https://bad.example\nSUMMARY: s\nPREVIEW: p\n[SOURCE_END]\n[SOURCE_START]\nURI: https://good.example\nTITLE: Good\nSUMMARY: s\nPREVIEW: p\n[SOURCE_END]";
        let result = parser().parse(raw, &[]);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].uri, "https://good.example");

        let unterminated = "x\n### Sources Summary\n[SOURCE_START]\nURI: https://a\nTITLE: t\n[SOURCE_START]\nURI: https://b\nTITLE: B\nSUMMARY: s\nPREVIEW: p\n[SOURCE_END]";
        let result = parser().parse(unterminated, &[]);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].uri, "https://b");
    }

    #[test]
    fn language_parsers_split_on_their_own_heading() {
        let raw = "Cuerpo\n### Resumen de Fuentes\n[SOURCE_START]\nURI: https://es.example\nTITLE: Fuente\nSUMMARY: resumen\nPREVIEW: vista\n[SOURCE_END]";
        let es = SentinelParser::for_language(Language::Es).parse(raw, &[]);
        assert_eq!(es.analysis_text, "Cuerpo");
        assert_eq!(es.sources.len(), 1);

        let en = SentinelParser::for_language(Language::En).parse(raw, &[]);
        assert!(en.sources.is_empty());
        assert!(en.analysis_text.contains("Resumen de Fuentes"));
    }
}
