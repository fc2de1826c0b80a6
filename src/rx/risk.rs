use crate::rx::locale::Locale;
use crate::rx::model::AnalysisResult;
use serde::Serialize;

/// The two literals recognized as the severe tier. Other localized synonyms
/// are deliberately not escalated.
const HIGH_RISK_LITERALS: [&str; 2] = ["high", "alto"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    DrugDrug,
    DrugSubstance,
    DrugCondition,
    DrugPharmacogenetic,
    BeersCriteria,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::DrugDrug,
        RiskCategory::DrugSubstance,
        RiskCategory::DrugCondition,
        RiskCategory::DrugPharmacogenetic,
        RiskCategory::BeersCriteria,
    ];

    pub fn label(self, locale: &Locale) -> &'static str {
        match self {
            RiskCategory::DrugDrug => locale.labels.drug_drug,
            RiskCategory::DrugSubstance => locale.labels.drug_substance,
            RiskCategory::DrugCondition => locale.labels.drug_condition,
            RiskCategory::DrugPharmacogenetic => locale.labels.drug_pharmacogenetic,
            RiskCategory::BeersCriteria => locale.labels.beers_criteria,
        }
    }

    pub fn section_title(self, locale: &Locale) -> &'static str {
        match self {
            RiskCategory::DrugDrug => locale.labels.section_drug_drug,
            RiskCategory::DrugSubstance => locale.labels.section_drug_substance,
            RiskCategory::DrugCondition => locale.labels.section_drug_condition,
            RiskCategory::DrugPharmacogenetic => locale.labels.section_drug_pharmacogenetic,
            RiskCategory::BeersCriteria => locale.labels.section_beers_criteria,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighRiskItem {
    pub category: RiskCategory,
    pub description: String,
}

pub fn is_high_risk(risk_level: &str) -> bool {
    let lower = risk_level.to_lowercase();
    HIGH_RISK_LITERALS.contains(&lower.as_str())
}

/// High-risk entries across all categories, in category declaration order and
/// list order within each category.
pub fn collect_high_risk(result: &AnalysisResult, locale: &Locale) -> Vec<HighRiskItem> {
    let mut items = Vec::new();
    let mut push = |category: RiskCategory, description: String| {
        items.push(HighRiskItem {
            category,
            description,
        });
    };

    for i in &result.drug_drug_interactions {
        if is_high_risk(&i.risk_level) {
            push(RiskCategory::DrugDrug, i.interaction.clone());
        }
    }
    for i in &result.drug_substance_interactions {
        if is_high_risk(&i.risk_level) {
            push(
                RiskCategory::DrugSubstance,
                format!("{} + {}", i.medication, i.substance),
            );
        }
    }
    for i in &result.drug_condition_contraindications {
        if is_high_risk(&i.risk_level) {
            push(
                RiskCategory::DrugCondition,
                format!("{} {} {}", i.medication, locale.labels.with, i.condition),
            );
        }
    }
    for i in &result.drug_pharmacogenetic_contraindications {
        if is_high_risk(&i.risk_level) {
            push(
                RiskCategory::DrugPharmacogenetic,
                format!("{} ({})", i.medication, i.genetic_factor),
            );
        }
    }
    for i in &result.beers_criteria_alerts {
        if is_high_risk(&i.risk_level) {
            push(
                RiskCategory::BeersCriteria,
                format!("{} ({})", i.medication, i.criteria),
            );
        }
    }

    items
}
