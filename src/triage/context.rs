use crate::models::{MedicalCase, PatientHistory, SymptomRequest};

/// System prompt for the primary inference call. Demands a strict-JSON reply
/// so the parser has a fighting chance before the fallback chain kicks in.
pub const TRIAGE_SYSTEM_PROMPT: &str = r#"You are a medical triage assistant. Analyze the patient information provided and produce a structured medical assessment.

Consider the patient's symptoms, their history, and any similar prior cases. Provide probable diagnoses with confidence levels, assess severity and urgency, and recommend appropriate actions and tests.

IMPORTANT: Respond with ONLY valid JSON in the following format:
{
    "probable_diagnoses": [
        {"condition": "condition_name", "confidence": 0.8}
    ],
    "severity_assessment": "low|medium|high|critical",
    "recommended_actions": ["action1", "action2"],
    "suggested_tests": ["test1", "test2"],
    "urgency_level": "immediate|within_hours|within_days|routine",
    "confidence_score": 0.7,
    "disclaimer": "Medical disclaimer text"
}"#;

/// Assemble the evidence context: the sole input to primary inference.
///
/// Optional sections are omitted when their input is absent, never replaced
/// by placeholders. Similar cases render as `symptoms | diagnosis | outcome`.
pub fn build_evidence_context(
    request: &SymptomRequest,
    history: Option<&PatientHistory>,
    similar_cases: &[MedicalCase],
) -> String {
    let mut sections = Vec::new();

    sections.push(section("PATIENT SYMPTOMS", &request.symptoms));
    sections.push(section(
        "PERCEIVED SEVERITY",
        request.severity_level.as_str(),
    ));

    if let Some(history) = history {
        let body = [
            format!("Conditions: {}", history.conditions.join(", ")),
            format!("Medications: {}", history.medications.join(", ")),
            format!("Allergies: {}", history.allergies.join(", ")),
            format!("Surgeries: {}", history.surgeries.join(", ")),
        ]
        .join("\n");
        sections.push(section("PATIENT HISTORY", &body));
    }

    if let Some(additional) = request.additional_context.as_deref() {
        if !additional.trim().is_empty() {
            sections.push(section("ADDITIONAL CONTEXT", additional));
        }
    }

    if !similar_cases.is_empty() {
        let body = similar_cases
            .iter()
            .map(|case| {
                format!(
                    "- {} | {} | {}",
                    case.symptoms_text, case.diagnosis, case.outcome
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(section("SIMILAR CASES", &body));
    }

    sections.join("\n\n")
}

fn section(label: &str, body: &str) -> String {
    format!("<{label}>\n{body}\n</{label}>")
}
