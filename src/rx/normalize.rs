use crate::rx::model::{AnalysisResult, PartialAnalysisResult};

/// Fill every absent category with an empty list. Present lists pass through
/// untouched: no reordering, no de-duplication.
pub fn normalize(partial: PartialAnalysisResult) -> AnalysisResult {
    AnalysisResult {
        analysis_text: partial.analysis_text,
        sources: partial.sources,
        drug_drug_interactions: partial.drug_drug_interactions.unwrap_or_default(),
        drug_substance_interactions: partial.drug_substance_interactions.unwrap_or_default(),
        drug_condition_contraindications: partial
            .drug_condition_contraindications
            .unwrap_or_default(),
        drug_pharmacogenetic_contraindications: partial
            .drug_pharmacogenetic_contraindications
            .unwrap_or_default(),
        beers_criteria_alerts: partial.beers_criteria_alerts.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::rx::model::{
        AnalysisResult, BeersCriteriaAlert, DrugDrugInteraction, PartialAnalysisResult, Source,
    };

    fn sample() -> PartialAnalysisResult {
        PartialAnalysisResult {
            analysis_text: "narrative".to_string(),
            sources: vec![Source {
                uri: "https://example.org".to_string(),
                title: "Example".to_string(),
                summary: None,
                preview: None,
            }],
            drug_drug_interactions: Some(vec![
                DrugDrugInteraction {
                    interaction: "B + A".to_string(),
                    risk_level: "Low".to_string(),
                    ..Default::default()
                },
                DrugDrugInteraction {
                    interaction: "B + A".to_string(),
                    risk_level: "Low".to_string(),
                    ..Default::default()
                },
            ]),
            drug_substance_interactions: None,
            drug_condition_contraindications: Some(Vec::new()),
            drug_pharmacogenetic_contraindications: None,
            beers_criteria_alerts: Some(vec![BeersCriteriaAlert {
                medication: "Diazepam".to_string(),
                ..Default::default()
            }]),
        }
    }

    #[test]
    fn absent_categories_become_empty_and_others_are_unchanged() {
        let input = sample();
        let out = normalize(input.clone());
        assert!(out.drug_substance_interactions.is_empty());
        assert!(out.drug_pharmacogenetic_contraindications.is_empty());
        assert_eq!(
            Some(out.drug_drug_interactions.clone()),
            input.drug_drug_interactions
        );
        assert_eq!(out.drug_drug_interactions.len(), 2);
        assert_eq!(Some(out.beers_criteria_alerts.clone()), input.beers_criteria_alerts);
        assert_eq!(out.analysis_text, input.analysis_text);
        assert_eq!(out.sources, input.sources);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(sample());
        let twice = normalize(PartialAnalysisResult::from(once.clone()));
        assert_eq!(once, twice);

        let empty = normalize(PartialAnalysisResult::default());
        assert_eq!(empty, AnalysisResult::default());
        assert_eq!(normalize(empty.clone().into()), empty);
    }
}
