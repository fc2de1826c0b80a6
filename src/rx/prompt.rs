use crate::rx::locale::{Locale, locale};
use crate::rx::model::{
    AnalysisInputs, BeersCriteriaAlert, DrugConditionContraindication, DrugDrugInteraction,
    DrugPharmacogeneticContraindication, DrugSubstanceInteraction, PartialAnalysisResult,
};

pub const INTERACTION_DATA_START: &str = "[INTERACTION_DATA_START]";
pub const INTERACTION_DATA_END: &str = "[INTERACTION_DATA_END]";
pub const SOURCE_START: &str = "[SOURCE_START]";
pub const SOURCE_END: &str = "[SOURCE_END]";

/// Markdown heading that separates the narrative from the source blocks.
pub fn sources_heading(locale: &Locale) -> String {
    format!("### {}", locale.prompt.sources_summary_title)
}

fn provided_or(value: &str, label: &str, none: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        none.to_string()
    } else {
        format!("{label}: {trimmed}.")
    }
}

/// JSON shape shown to the model. Serialized from the schema types so the
/// category keys cannot drift from what the parser expects.
fn json_example(locale: &Locale) -> String {
    let ex = &locale.prompt.example;
    let example = PartialAnalysisResult {
        drug_drug_interactions: Some(vec![DrugDrugInteraction {
            interaction: ex.interaction.to_string(),
            risk_level: ex.risk_level.to_string(),
            potential_effects: ex.potential_effects.to_string(),
            recommendations: ex.recommendations.to_string(),
            references: ex.references.to_string(),
        }]),
        drug_substance_interactions: Some(vec![DrugSubstanceInteraction {
            medication: ex.medication.to_string(),
            substance: ex.substance.to_string(),
            risk_level: ex.risk_level.to_string(),
            potential_effects: ex.potential_effects.to_string(),
            recommendations: ex.recommendations.to_string(),
            references: ex.references.to_string(),
        }]),
        drug_condition_contraindications: Some(vec![DrugConditionContraindication {
            medication: ex.medication.to_string(),
            condition: ex.condition.to_string(),
            risk_level: ex.risk_level.to_string(),
            contraindication_details: ex.contraindication_details.to_string(),
            recommendations: ex.recommendations.to_string(),
            references: ex.references.to_string(),
        }]),
        drug_pharmacogenetic_contraindications: Some(vec![DrugPharmacogeneticContraindication {
            medication: ex.medication.to_string(),
            genetic_factor: ex.genetic_factor.to_string(),
            risk_level: ex.risk_level.to_string(),
            implication: ex.implication.to_string(),
            recommendations: ex.recommendations.to_string(),
            references: ex.references.to_string(),
        }]),
        beers_criteria_alerts: Some(vec![BeersCriteriaAlert {
            medication: ex.medication.to_string(),
            criteria: ex.criteria.to_string(),
            risk_level: ex.risk_level.to_string(),
            recommendations: ex.recommendations.to_string(),
            references: ex.references.to_string(),
        }]),
        ..PartialAnalysisResult::default()
    };
    // Plain structs of strings always serialize.
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

pub fn build_prompt(inputs: &AnalysisInputs) -> String {
    let locale = locale(inputs.language);
    let t = &locale.prompt;

    let med_list = inputs.medications.join(", ");
    let substance_text = provided_or(
        &inputs.other_substances,
        t.other_substances,
        t.no_other_substances,
    );
    let pharmacogenetics_text = provided_or(
        &inputs.pharmacogenetics,
        t.pharmacogenetics_info,
        t.no_pharmacogenetics_info,
    );
    let conditions_text = provided_or(
        &inputs.conditions,
        t.preexisting_conditions,
        t.no_preexisting_conditions,
    );
    let dob_text = if inputs.date_of_birth.trim().is_empty() {
        t.no_dob.to_string()
    } else {
        format!("{}: {}. {}", t.dob, inputs.date_of_birth.trim(), t.dob_note)
    };

    let mut out = String::new();
    out.push_str(t.role);
    out.push_str("\n\n");
    out.push_str(t.master_instruction);
    out.push('\n');
    out.push_str(t.part1);
    out.push('\n');
    out.push_str(t.part2);
    out.push_str("\n\n");

    out.push_str(t.json_example_title);
    out.push('\n');
    out.push_str(INTERACTION_DATA_START);
    out.push('\n');
    out.push_str(&json_example(locale));
    out.push('\n');
    out.push_str(INTERACTION_DATA_END);
    out.push_str("\n\n");

    out.push_str(t.readable_analysis_title);
    out.push_str("\n\n");
    out.push_str(&format!("### {}\n", t.critical_summary_title));
    for line in t.critical_summary_instructions {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    out.push_str(t.detailed_analysis_title);
    out.push('\n');
    out.push_str(t.detailed_analysis_intro);
    out.push('\n');
    out.push_str(&format!("- {}: {}\n", t.medications, med_list));
    out.push_str(&format!("- {substance_text}\n"));
    out.push_str(&format!("- {pharmacogenetics_text}\n"));
    out.push_str(&format!("- {conditions_text}\n"));
    out.push_str(&format!("- {dob_text}\n\n"));
    out.push_str(t.detailed_analysis_instruction);
    out.push('\n');

    for (idx, (title, description)) in t.sections.iter().enumerate() {
        out.push_str(&format!("\n---\n### {}. {}\n*({})*\n", idx + 1, title, description));
    }

    out.push('\n');
    out.push_str(t.final_disclaimer);
    out.push_str("\n\n");
    out.push_str(&sources_heading(locale));
    out.push('\n');
    out.push_str(t.sources_summary_instruction);
    out.push('\n');
    out.push_str(SOURCE_START);
    out.push('\n');
    out.push_str(&format!("URI: [{}]\n", t.source_uri));
    out.push_str(&format!("TITLE: [{}]\n", t.source_title));
    out.push_str(&format!("SUMMARY: [{}]\n", t.source_summary));
    out.push_str(&format!("PREVIEW: [{}]\n", t.source_preview));
    out.push_str(SOURCE_END);
    out.push('\n');
    out
}
