use crate::rx::locale::Locale;
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    #[default]
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "es" | "spa" | "spanish" | "espanol" | "español" => Some(Language::Es),
            "en" | "eng" | "english" => Some(Language::En),
            _ => None,
        }
    }

    /// Pick a language from a POSIX-style locale tag (`es_AR.UTF-8`, `en-GB`).
    pub fn from_locale_tag(tag: &str) -> Self {
        let primary = tag
            .split(['_', '-', '.'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if primary == "es" {
            Language::Es
        } else {
            Language::En
        }
    }

    pub fn detect() -> Self {
        for var in ["RXCHECK_LANG", "LC_ALL", "LANG"] {
            if let Ok(v) = env::var(var)
                && !v.trim().is_empty()
            {
                return Language::parse(&v).unwrap_or_else(|| Language::from_locale_tag(&v));
            }
        }
        Language::En
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInputs {
    pub medications: Vec<String>,
    #[serde(default)]
    pub other_substances: String,
    #[serde(default)]
    pub pharmacogenetics: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default, rename = "lang")]
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("add at least one medication")]
    NoMedications,
    #[error("medication `{0}` is already in the list")]
    DuplicateMedication(String),
    #[error("describe the patient's conditions")]
    NoConditions,
    #[error("date of birth must use the DD-MM-YYYY format")]
    DateOfBirthFormat,
    #[error("date of birth is not a valid calendar date")]
    DateOfBirthInvalid,
    #[error("date of birth cannot be in the future")]
    DateOfBirthInFuture,
}

impl InputError {
    pub fn user_message(&self, locale: &Locale) -> &'static str {
        match self {
            InputError::NoMedications => locale.messages.add_medication,
            InputError::DuplicateMedication(_) => locale.messages.duplicate_medication,
            InputError::NoConditions => locale.messages.add_conditions,
            InputError::DateOfBirthFormat => locale.messages.dob_format,
            InputError::DateOfBirthInvalid => locale.messages.dob_invalid,
            InputError::DateOfBirthInFuture => locale.messages.dob_future,
        }
    }
}

impl AnalysisInputs {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Append a medication, keeping insertion order. Blank or already-present
    /// names (exact match) are rejected.
    pub fn add_medication(&mut self, name: &str) -> Result<(), InputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InputError::NoMedications);
        }
        if self.medications.iter().any(|m| m == name) {
            return Err(InputError::DuplicateMedication(name.to_string()));
        }
        self.medications.push(name.to_string());
        Ok(())
    }

    pub fn remove_medication(&mut self, name: &str) -> bool {
        let before = self.medications.len();
        self.medications.retain(|m| m != name);
        self.medications.len() != before
    }

    pub fn validate(&self) -> Result<(), InputError> {
        self.validate_at(Local::now().date_naive())
    }

    fn validate_at(&self, today: NaiveDate) -> Result<(), InputError> {
        if self.medications.is_empty() {
            return Err(InputError::NoMedications);
        }
        if self.conditions.trim().is_empty() {
            return Err(InputError::NoConditions);
        }
        validate_date_of_birth(&self.date_of_birth, today)
    }
}

fn validate_date_of_birth(raw: &str, today: NaiveDate) -> Result<(), InputError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(());
    }

    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, b)| idx == 2 || idx == 5 || b.is_ascii_digit());
    if !shape_ok {
        return Err(InputError::DateOfBirthFormat);
    }

    let day: u32 = value[0..2].parse().map_err(|_| InputError::DateOfBirthFormat)?;
    let month: u32 = value[3..5].parse().map_err(|_| InputError::DateOfBirthFormat)?;
    let year: i32 = value[6..10].parse().map_err(|_| InputError::DateOfBirthFormat)?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(InputError::DateOfBirthInvalid)?;
    if date > today {
        return Err(InputError::DateOfBirthInFuture);
    }
    Ok(())
}

/// Model output is loosely typed: a text field may come back as `null`, a
/// number or a list of strings. Lists are joined with `"; "`.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(flatten_text(Value::deserialize(deserializer)?))
}

fn flatten_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(flatten_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        other @ Value::Object(_) => other.to_string(),
    }
}

/// Deserialize a category entry by entry. Entries that do not fit the record
/// shape are logged and skipped; a non-array value counts as absent.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            tracing::warn!(
                found = %json_kind(&other),
                "structured category is not an array; treating it as absent"
            );
            return Ok(None);
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<T>(entry) {
            Ok(record) => out.push(record),
            Err(err) => tracing::warn!(index, error = %err, "skipping malformed structured entry"),
        }
    }
    Ok(Some(out))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DrugDrugInteraction {
    #[serde(deserialize_with = "lenient_text")]
    pub interaction: String,
    #[serde(deserialize_with = "lenient_text")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient_text")]
    pub potential_effects: String,
    #[serde(deserialize_with = "lenient_text")]
    pub recommendations: String,
    #[serde(deserialize_with = "lenient_text")]
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DrugSubstanceInteraction {
    #[serde(deserialize_with = "lenient_text")]
    pub medication: String,
    #[serde(deserialize_with = "lenient_text")]
    pub substance: String,
    #[serde(deserialize_with = "lenient_text")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient_text")]
    pub potential_effects: String,
    #[serde(deserialize_with = "lenient_text")]
    pub recommendations: String,
    #[serde(deserialize_with = "lenient_text")]
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DrugConditionContraindication {
    #[serde(deserialize_with = "lenient_text")]
    pub medication: String,
    #[serde(deserialize_with = "lenient_text")]
    pub condition: String,
    #[serde(deserialize_with = "lenient_text")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient_text")]
    pub contraindication_details: String,
    #[serde(deserialize_with = "lenient_text")]
    pub recommendations: String,
    #[serde(deserialize_with = "lenient_text")]
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DrugPharmacogeneticContraindication {
    #[serde(deserialize_with = "lenient_text")]
    pub medication: String,
    #[serde(deserialize_with = "lenient_text")]
    pub genetic_factor: String,
    #[serde(deserialize_with = "lenient_text")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient_text")]
    pub implication: String,
    #[serde(deserialize_with = "lenient_text")]
    pub recommendations: String,
    #[serde(deserialize_with = "lenient_text")]
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BeersCriteriaAlert {
    #[serde(deserialize_with = "lenient_text")]
    pub medication: String,
    #[serde(deserialize_with = "lenient_text")]
    pub criteria: String,
    #[serde(deserialize_with = "lenient_text")]
    pub risk_level: String,
    #[serde(deserialize_with = "lenient_text")]
    pub recommendations: String,
    #[serde(deserialize_with = "lenient_text")]
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Citation side-channel returned next to the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundingSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// Analysis with every structured category present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_text: String,
    pub sources: Vec<Source>,
    pub drug_drug_interactions: Vec<DrugDrugInteraction>,
    pub drug_substance_interactions: Vec<DrugSubstanceInteraction>,
    pub drug_condition_contraindications: Vec<DrugConditionContraindication>,
    pub drug_pharmacogenetic_contraindications: Vec<DrugPharmacogeneticContraindication>,
    pub beers_criteria_alerts: Vec<BeersCriteriaAlert>,
}

impl AnalysisResult {
    pub fn record_count(&self) -> usize {
        self.drug_drug_interactions.len()
            + self.drug_substance_interactions.len()
            + self.drug_condition_contraindications.len()
            + self.drug_pharmacogenetic_contraindications.len()
            + self.beers_criteria_alerts.len()
    }
}

/// Persisted / wire shape: any category may be missing.
///
/// This is what the JSON block inside a model answer deserializes into, and
/// what history snapshots written by older builds contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialAnalysisResult {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub analysis_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    #[serde(deserialize_with = "lenient_entries")]
    pub drug_drug_interactions: Option<Vec<DrugDrugInteraction>>,
    #[serde(deserialize_with = "lenient_entries")]
    pub drug_substance_interactions: Option<Vec<DrugSubstanceInteraction>>,
    #[serde(deserialize_with = "lenient_entries")]
    pub drug_condition_contraindications: Option<Vec<DrugConditionContraindication>>,
    #[serde(deserialize_with = "lenient_entries")]
    pub drug_pharmacogenetic_contraindications: Option<Vec<DrugPharmacogeneticContraindication>>,
    #[serde(deserialize_with = "lenient_entries")]
    pub beers_criteria_alerts: Option<Vec<BeersCriteriaAlert>>,
}

impl From<AnalysisResult> for PartialAnalysisResult {
    fn from(result: AnalysisResult) -> Self {
        Self {
            analysis_text: result.analysis_text,
            sources: result.sources,
            drug_drug_interactions: Some(result.drug_drug_interactions),
            drug_substance_interactions: Some(result.drug_substance_interactions),
            drug_condition_contraindications: Some(result.drug_condition_contraindications),
            drug_pharmacogenetic_contraindications: Some(
                result.drug_pharmacogenetic_contraindications,
            ),
            beers_criteria_alerts: Some(result.beers_criteria_alerts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub inputs: AnalysisInputs,
    pub analysis_result: PartialAnalysisResult,
}

impl HistoryItem {
    pub fn new(inputs: AnalysisInputs, result: AnalysisResult) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            timestamp: now
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            inputs,
            analysis_result: result.into(),
        }
    }

    pub fn language(&self) -> Language {
        self.inputs.language
    }

    /// Normalized copy of the stored analysis.
    pub fn result(&self) -> AnalysisResult {
        crate::rx::normalize::normalize(self.analysis_result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
    }

    fn filled() -> AnalysisInputs {
        let mut inputs = AnalysisInputs::new(Language::En);
        inputs.add_medication("Warfarin").expect("add");
        inputs.conditions = "Atrial fibrillation".to_string();
        inputs
    }

    #[test]
    fn medications_keep_order_and_reject_exact_duplicates() {
        let mut inputs = AnalysisInputs::new(Language::En);
        inputs.add_medication("Warfarin").expect("add warfarin");
        inputs.add_medication("Aspirin").expect("add aspirin");
        assert_eq!(
            inputs.add_medication("Warfarin"),
            Err(InputError::DuplicateMedication("Warfarin".to_string()))
        );
        inputs.add_medication("warfarin").expect("case differs");
        assert_eq!(inputs.medications, vec!["Warfarin", "Aspirin", "warfarin"]);
        assert!(inputs.remove_medication("Aspirin"));
        assert!(!inputs.remove_medication("Aspirin"));
    }

    #[test]
    fn validation_requires_medication_and_conditions() {
        let mut inputs = AnalysisInputs::new(Language::Es);
        assert_eq!(inputs.validate_at(today()), Err(InputError::NoMedications));
        inputs.add_medication("Metformina").expect("add");
        inputs.conditions = "   ".to_string();
        assert_eq!(inputs.validate_at(today()), Err(InputError::NoConditions));
    }

    #[test]
    fn date_of_birth_rules() {
        let mut inputs = filled();
        assert_eq!(inputs.validate_at(today()), Ok(()));

        inputs.date_of_birth = "1950-01-01".to_string();
        assert_eq!(
            inputs.validate_at(today()),
            Err(InputError::DateOfBirthFormat)
        );

        inputs.date_of_birth = "31-02-1950".to_string();
        assert_eq!(
            inputs.validate_at(today()),
            Err(InputError::DateOfBirthInvalid)
        );

        inputs.date_of_birth = "01-01-2030".to_string();
        assert_eq!(
            inputs.validate_at(today()),
            Err(InputError::DateOfBirthInFuture)
        );

        inputs.date_of_birth = "29-02-1952".to_string();
        assert_eq!(inputs.validate_at(today()), Ok(()));
    }

    #[test]
    fn language_detection_from_locale_tags() {
        assert_eq!(Language::from_locale_tag("es_AR.UTF-8"), Language::Es);
        assert_eq!(Language::from_locale_tag("es-ES"), Language::Es);
        assert_eq!(Language::from_locale_tag("en_GB.UTF-8"), Language::En);
        assert_eq!(Language::from_locale_tag("fr_FR"), Language::En);
        assert_eq!(Language::parse(" ES "), Some(Language::Es));
        assert_eq!(Language::parse("de"), None);
    }

    #[test]
    fn history_item_reads_entries_written_without_optional_fields() {
        let raw = r#"{
            "id": "2025-01-01T10:00:00.000Z",
            "timestamp": "1/1/2025, 10:00:00",
            "medications": ["Warfarin"],
            "otherSubstances": "",
            "conditions": "AF",
            "analysisResult": {
                "analysisText": "text",
                "sources": [],
                "drugDrugInteractions": [],
                "drugSubstanceInteractions": []
            }
        }"#;
        let item: HistoryItem = serde_json::from_str(raw).expect("parse legacy item");
        assert_eq!(item.language(), Language::En);
        assert_eq!(item.inputs.date_of_birth, "");
        assert!(item.analysis_result.beers_criteria_alerts.is_none());
        assert!(item.result().beers_criteria_alerts.is_empty());
    }

    #[test]
    fn history_item_serializes_with_lang_code() {
        let mut inputs = filled();
        inputs.language = Language::Es;
        let item = HistoryItem::new(inputs, AnalysisResult::default());
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["lang"], "es");
        assert_eq!(json["medications"][0], "Warfarin");
        assert!(json["analysisResult"]["drugDrugInteractions"].is_array());
        assert!(item.id.ends_with('Z'));
    }
}
