use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A patient's current medical history snapshot.
///
/// At most one live snapshot exists per patient; storing a new one replaces
/// it, while the derived case entry from every upload stays searchable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientHistory {
    pub patient_id: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub surgeries: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub last_updated: DateTime<Utc>,
}

impl PatientHistory {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            conditions: Vec::new(),
            medications: Vec::new(),
            allergies: Vec::new(),
            surgeries: Vec::new(),
            notes: String::new(),
            last_updated: Utc::now(),
        }
    }

    /// Canonical text rendering used for embedding generation.
    ///
    /// Field order and delimiters are fixed: identical histories must always
    /// produce identical text, or retrieval stops being reproducible.
    pub fn canonical_text(&self) -> String {
        [
            format!("Conditions: {}", self.conditions.join(", ")),
            format!("Medications: {}", self.medications.join(", ")),
            format!("Allergies: {}", self.allergies.join(", ")),
            format!("Surgeries: {}", self.surgeries.join(", ")),
            format!("Notes: {}", self.notes),
        ]
        .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientHistory {
        PatientHistory {
            conditions: vec!["Hypertension".into(), "Type 2 Diabetes".into()],
            medications: vec!["Amlodipine".into()],
            allergies: vec!["Penicillin".into()],
            surgeries: vec![],
            notes: "Follow-up in 3 months".into(),
            ..PatientHistory::new("P1")
        }
    }

    #[test]
    fn canonical_text_uses_fixed_field_order() {
        let text = sample().canonical_text();
        assert_eq!(
            text,
            "Conditions: Hypertension, Type 2 Diabetes | Medications: Amlodipine \
             | Allergies: Penicillin | Surgeries:  | Notes: Follow-up in 3 months"
        );
    }

    #[test]
    fn canonical_text_is_deterministic() {
        let history = sample();
        assert_eq!(history.canonical_text(), history.canonical_text());
    }

    #[test]
    fn empty_history_still_renders_all_fields() {
        let text = PatientHistory::new("P2").canonical_text();
        assert!(text.contains("Conditions:"));
        assert!(text.contains("Notes:"));
        assert_eq!(text.matches(" | ").count(), 4);
    }
}
