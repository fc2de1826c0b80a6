//! Text tables for the two supported languages.
//!
//! Every string the prompt, renderer and exporters need is a named field, so
//! a table missing an entry fails to compile instead of leaking a blank into
//! a prompt.

use crate::rx::model::Language;

#[derive(Debug)]
pub struct Locale {
    pub prompt: PromptText,
    pub labels: Labels,
    pub messages: Messages,
}

#[derive(Debug)]
pub struct PromptText {
    pub role: &'static str,
    pub master_instruction: &'static str,
    pub part1: &'static str,
    pub part2: &'static str,
    pub json_example_title: &'static str,
    pub readable_analysis_title: &'static str,
    pub critical_summary_title: &'static str,
    pub critical_summary_instructions: [&'static str; 3],
    pub detailed_analysis_title: &'static str,
    pub detailed_analysis_intro: &'static str,
    pub detailed_analysis_instruction: &'static str,
    pub medications: &'static str,
    pub other_substances: &'static str,
    pub no_other_substances: &'static str,
    pub pharmacogenetics_info: &'static str,
    pub no_pharmacogenetics_info: &'static str,
    pub preexisting_conditions: &'static str,
    pub no_preexisting_conditions: &'static str,
    pub dob: &'static str,
    pub dob_note: &'static str,
    pub no_dob: &'static str,
    /// `(title, description)` for the five numbered narrative sections.
    pub sections: [(&'static str, &'static str); 5],
    pub final_disclaimer: &'static str,
    pub sources_summary_title: &'static str,
    pub sources_summary_instruction: &'static str,
    pub source_uri: &'static str,
    pub source_title: &'static str,
    pub source_summary: &'static str,
    pub source_preview: &'static str,
    pub example: ExampleText,
}

/// Placeholder values used to fill the JSON shape shown to the model.
#[derive(Debug)]
pub struct ExampleText {
    pub interaction: &'static str,
    pub medication: &'static str,
    pub substance: &'static str,
    pub condition: &'static str,
    pub genetic_factor: &'static str,
    pub criteria: &'static str,
    pub risk_level: &'static str,
    pub potential_effects: &'static str,
    pub contraindication_details: &'static str,
    pub implication: &'static str,
    pub recommendations: &'static str,
    pub references: &'static str,
}

#[derive(Debug)]
pub struct Labels {
    pub results_title: &'static str,
    pub drug_drug: &'static str,
    pub drug_substance: &'static str,
    pub drug_condition: &'static str,
    pub drug_pharmacogenetic: &'static str,
    pub beers_criteria: &'static str,
    pub section_drug_drug: &'static str,
    pub section_drug_substance: &'static str,
    pub section_drug_condition: &'static str,
    pub section_drug_pharmacogenetic: &'static str,
    pub section_beers_criteria: &'static str,
    pub section_sources: &'static str,
    pub high_risk_title: &'static str,
    pub high_risk_intro: &'static str,
    pub risk_level: &'static str,
    pub potential_effects: &'static str,
    pub details: &'static str,
    pub implication: &'static str,
    pub criteria_reason: &'static str,
    pub recommendations: &'static str,
    pub references: &'static str,
    /// Connective in "medication with condition".
    pub with: &'static str,
    pub csv_headers: [&'static str; 7],
    pub csv_na: &'static str,
    pub history_empty: &'static str,
}

#[derive(Debug)]
pub struct Messages {
    pub api_key_not_set: &'static str,
    pub api_key_empty: &'static str,
    pub api_key_invalid: &'static str,
    pub safety_block: &'static str,
    pub no_response: &'static str,
    pub service_unavailable: &'static str,
    pub add_medication: &'static str,
    pub duplicate_medication: &'static str,
    pub add_conditions: &'static str,
    pub dob_format: &'static str,
    pub dob_invalid: &'static str,
    pub dob_future: &'static str,
}

pub fn locale(language: Language) -> &'static Locale {
    match language {
        Language::Es => &ES,
        Language::En => &EN,
    }
}

static EN: Locale = Locale {
    prompt: PromptText {
        role: "You are an expert clinical pharmacologist reviewing a patient's medication regimen. Use up-to-date, reputable sources found through web search.",
        master_instruction: "Your answer MUST have exactly two parts, in this order, with no text before the first part.",
        part1: "PART 1: a single JSON object between the literal markers [INTERACTION_DATA_START] and [INTERACTION_DATA_END]. Use exactly the keys shown. Use an empty array for a category with no findings. riskLevel must be one of: High, Moderate, Low.",
        part2: "PART 2: a human-readable analysis in markdown following the structure below, ending with the sources summary.",
        json_example_title: "JSON format example:",
        readable_analysis_title: "## Readable analysis",
        critical_summary_title: "Critical Summary",
        critical_summary_instructions: [
            "- List only the high-risk findings, one bullet each, in bold.",
            "- State in one sentence what the clinician should do first.",
            "- If nothing is high risk, say so explicitly.",
        ],
        detailed_analysis_title: "## Detailed analysis",
        detailed_analysis_intro: "Patient information:",
        detailed_analysis_instruction: "Analyze every medication against every other item above. Be specific about mechanisms, severity and monitoring.",
        medications: "Medications",
        other_substances: "Other substances (supplements, herbal products, alcohol, food)",
        no_other_substances: "No other substances reported.",
        pharmacogenetics_info: "Pharmacogenetic information",
        no_pharmacogenetics_info: "No pharmacogenetic information provided.",
        preexisting_conditions: "Pre-existing conditions",
        no_preexisting_conditions: "No pre-existing conditions reported.",
        dob: "Date of birth (DD-MM-YYYY)",
        dob_note: "Compute the patient's age and apply the AGS Beers Criteria if they are 65 or older.",
        no_dob: "Date of birth not provided; skip age-specific criteria.",
        sections: [
            (
                "Drug-Drug Interactions",
                "Each pair of interacting medications, mechanism, effects, risk level and recommendations.",
            ),
            (
                "Drug-Substance Interactions",
                "Interactions between the medications and the other substances reported.",
            ),
            (
                "Drug-Condition Contraindications",
                "Medications that are contraindicated or need caution given the patient's conditions.",
            ),
            (
                "Pharmacogenetic Contraindications",
                "Medications affected by the reported genetic factors.",
            ),
            (
                "Beers Criteria Alerts",
                "Potentially inappropriate medications for older adults, only when age applies.",
            ),
        ],
        final_disclaimer: "*This analysis is informational and does not replace the judgement of a qualified healthcare professional.*",
        sources_summary_title: "Sources Summary",
        sources_summary_instruction: "For each source you used, output one block exactly like this:",
        source_uri: "full URL of the source",
        source_title: "title of the page or article",
        source_summary: "one-sentence summary of what the source supports",
        source_preview: "short verbatim excerpt from the source",
        example: ExampleText {
            interaction: "Medication A + Medication B",
            medication: "Medication A",
            substance: "Substance X",
            condition: "Condition Y",
            genetic_factor: "Gene variant (e.g. CYP2C19 poor metabolizer)",
            criteria: "Beers criterion that applies",
            risk_level: "High",
            potential_effects: "Clinical effects of the interaction",
            contraindication_details: "Why the medication is contraindicated",
            implication: "Clinical implication of the genetic factor",
            recommendations: "Concrete management recommendations",
            references: "Short citation of the supporting source",
        },
    },
    labels: Labels {
        results_title: "Interaction Analysis",
        drug_drug: "Drug-Drug Interaction",
        drug_substance: "Drug-Substance Interaction",
        drug_condition: "Condition Contraindication",
        drug_pharmacogenetic: "Pharmacogenetic Contraindication",
        beers_criteria: "Beers Criteria Alert",
        section_drug_drug: "Drug-Drug Interactions",
        section_drug_substance: "Drug-Substance Interactions",
        section_drug_condition: "Drug-Condition Contraindications",
        section_drug_pharmacogenetic: "Pharmacogenetic Contraindications",
        section_beers_criteria: "Beers Criteria Alerts",
        section_sources: "Sources",
        high_risk_title: "High-Risk Alert",
        high_risk_intro: "The following findings were rated high risk:",
        risk_level: "Risk level",
        potential_effects: "Potential effects",
        details: "Details",
        implication: "Implication",
        criteria_reason: "Criteria / reason",
        recommendations: "Recommendations",
        references: "References",
        with: "with",
        csv_headers: [
            "Type",
            "Primary Item",
            "Secondary Item",
            "Risk Level",
            "Details",
            "Recommendations",
            "References",
        ],
        csv_na: "N/A",
        history_empty: "No saved analyses yet.",
    },
    messages: Messages {
        api_key_not_set: "No API key configured. Run `rxcheck credential set <KEY>` first.",
        api_key_empty: "The API key cannot be empty.",
        api_key_invalid: "The API key was rejected. Enter a valid key and try again.",
        safety_block: "The request was blocked by the model's safety filters.",
        no_response: "The model returned an empty response. Please try again.",
        service_unavailable: "The analysis service is unavailable right now. Please try again later.",
        add_medication: "Add at least one medication.",
        duplicate_medication: "That medication is already in the list.",
        add_conditions: "Describe the patient's pre-existing conditions.",
        dob_format: "Use the DD-MM-YYYY format for the date of birth.",
        dob_invalid: "The date of birth is not a valid date.",
        dob_future: "The date of birth cannot be in the future.",
    },
};

static ES: Locale = Locale {
    prompt: PromptText {
        role: "Eres un farmacólogo clínico experto que revisa el tratamiento de un paciente. Usa fuentes actuales y fiables encontradas mediante búsqueda web.",
        master_instruction: "Tu respuesta DEBE tener exactamente dos partes, en este orden, sin texto antes de la primera parte.",
        part1: "PARTE 1: un único objeto JSON entre los marcadores literales [INTERACTION_DATA_START] y [INTERACTION_DATA_END]. Usa exactamente las claves mostradas. Usa un array vacío para las categorías sin hallazgos. riskLevel debe ser uno de: Alto, Moderado, Bajo.",
        part2: "PARTE 2: un análisis legible en markdown con la estructura siguiente, terminando con el resumen de fuentes.",
        json_example_title: "Ejemplo del formato JSON:",
        readable_analysis_title: "## Análisis legible",
        critical_summary_title: "Resumen Crítico",
        critical_summary_instructions: [
            "- Enumera solo los hallazgos de riesgo alto, uno por viñeta, en negrita.",
            "- Indica en una frase qué debe hacer primero el profesional.",
            "- Si nada es de riesgo alto, dilo explícitamente.",
        ],
        detailed_analysis_title: "## Análisis detallado",
        detailed_analysis_intro: "Información del paciente:",
        detailed_analysis_instruction: "Analiza cada medicamento frente a todos los demás elementos. Sé específico sobre mecanismos, gravedad y monitorización.",
        medications: "Medicamentos",
        other_substances: "Otras sustancias (suplementos, productos herbales, alcohol, alimentos)",
        no_other_substances: "No se informaron otras sustancias.",
        pharmacogenetics_info: "Información farmacogenética",
        no_pharmacogenetics_info: "No se proporcionó información farmacogenética.",
        preexisting_conditions: "Condiciones preexistentes",
        no_preexisting_conditions: "No se informaron condiciones preexistentes.",
        dob: "Fecha de nacimiento (DD-MM-AAAA)",
        dob_note: "Calcula la edad del paciente y aplica los Criterios de Beers de la AGS si tiene 65 años o más.",
        no_dob: "Fecha de nacimiento no proporcionada; omite los criterios según la edad.",
        sections: [
            (
                "Interacciones Medicamento-Medicamento",
                "Cada par de medicamentos que interactúan, mecanismo, efectos, nivel de riesgo y recomendaciones.",
            ),
            (
                "Interacciones Medicamento-Sustancia",
                "Interacciones entre los medicamentos y las otras sustancias informadas.",
            ),
            (
                "Contraindicaciones por Condición",
                "Medicamentos contraindicados o que requieren precaución según las condiciones del paciente.",
            ),
            (
                "Contraindicaciones Farmacogenéticas",
                "Medicamentos afectados por los factores genéticos informados.",
            ),
            (
                "Alertas de Criterios de Beers",
                "Medicamentos potencialmente inapropiados en adultos mayores, solo si la edad aplica.",
            ),
        ],
        final_disclaimer: "*Este análisis es informativo y no sustituye el criterio de un profesional sanitario cualificado.*",
        sources_summary_title: "Resumen de Fuentes",
        sources_summary_instruction: "Para cada fuente utilizada, escribe un bloque exactamente así:",
        source_uri: "URL completa de la fuente",
        source_title: "título de la página o artículo",
        source_summary: "resumen en una frase de lo que respalda la fuente",
        source_preview: "fragmento literal breve de la fuente",
        example: ExampleText {
            interaction: "Medicamento A + Medicamento B",
            medication: "Medicamento A",
            substance: "Sustancia X",
            condition: "Condición Y",
            genetic_factor: "Variante genética (p. ej. metabolizador lento de CYP2C19)",
            criteria: "Criterio de Beers aplicable",
            risk_level: "Alto",
            potential_effects: "Efectos clínicos de la interacción",
            contraindication_details: "Por qué el medicamento está contraindicado",
            implication: "Implicación clínica del factor genético",
            recommendations: "Recomendaciones concretas de manejo",
            references: "Cita breve de la fuente",
        },
    },
    labels: Labels {
        results_title: "Análisis de Interacciones",
        drug_drug: "Interacción Medicamento-Medicamento",
        drug_substance: "Interacción Medicamento-Sustancia",
        drug_condition: "Contraindicación por Condición",
        drug_pharmacogenetic: "Contraindicación Farmacogenética",
        beers_criteria: "Alerta de Criterios de Beers",
        section_drug_drug: "Interacciones Medicamento-Medicamento",
        section_drug_substance: "Interacciones Medicamento-Sustancia",
        section_drug_condition: "Contraindicaciones por Condición",
        section_drug_pharmacogenetic: "Contraindicaciones Farmacogenéticas",
        section_beers_criteria: "Alertas de Criterios de Beers",
        section_sources: "Fuentes",
        high_risk_title: "Alerta de Riesgo Alto",
        high_risk_intro: "Los siguientes hallazgos se calificaron como de riesgo alto:",
        risk_level: "Nivel de riesgo",
        potential_effects: "Efectos potenciales",
        details: "Detalles",
        implication: "Implicación",
        criteria_reason: "Criterio / motivo",
        recommendations: "Recomendaciones",
        references: "Referencias",
        with: "con",
        csv_headers: [
            "Tipo",
            "Elemento Principal",
            "Elemento Secundario",
            "Nivel de Riesgo",
            "Detalles",
            "Recomendaciones",
            "Referencias",
        ],
        csv_na: "N/D",
        history_empty: "Todavía no hay análisis guardados.",
    },
    messages: Messages {
        api_key_not_set: "No hay clave de API configurada. Ejecuta `rxcheck credential set <CLAVE>` primero.",
        api_key_empty: "La clave de API no puede estar vacía.",
        api_key_invalid: "La clave de API fue rechazada. Introduce una clave válida e inténtalo de nuevo.",
        safety_block: "La solicitud fue bloqueada por los filtros de seguridad del modelo.",
        no_response: "El modelo devolvió una respuesta vacía. Inténtalo de nuevo.",
        service_unavailable: "El servicio de análisis no está disponible ahora. Inténtalo más tarde.",
        add_medication: "Añade al menos un medicamento.",
        duplicate_medication: "Ese medicamento ya está en la lista.",
        add_conditions: "Describe las condiciones preexistentes del paciente.",
        dob_format: "Usa el formato DD-MM-AAAA para la fecha de nacimiento.",
        dob_invalid: "La fecha de nacimiento no es una fecha válida.",
        dob_future: "La fecha de nacimiento no puede estar en el futuro.",
    },
};
