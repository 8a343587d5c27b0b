use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{CandidateSource, SeverityLevel, UrgencyLevel};

/// A symptom analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub severity_level: SeverityLevel,
    #[serde(default)]
    pub additional_context: Option<String>,
}

impl SymptomRequest {
    pub fn new(symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            patient_id: None,
            severity_level: SeverityLevel::default(),
            additional_context: None,
        }
    }
}

/// One probable diagnosis with its confidence and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisCandidate {
    pub condition: String,
    pub confidence: f32,
    #[serde(default)]
    pub source: CandidateSource,
}

/// The pipeline's final answer for one request.
///
/// Owned by the request that produced it; never cached or shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub probable_diagnoses: Vec<DiagnosisCandidate>,
    pub severity_assessment: SeverityLevel,
    pub recommended_actions: Vec<String>,
    pub suggested_tests: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub confidence_score: f32,
    pub disclaimer: String,
    pub generated_at: DateTime<Utc>,
}
