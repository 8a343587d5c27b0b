use serde::Deserialize;

use crate::models::enums::{CandidateSource, SeverityLevel, UrgencyLevel};
use crate::models::DiagnosisCandidate;

use super::TriageError;

/// A structured assessment recovered from a reasoner reply.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub probable_diagnoses: Vec<DiagnosisCandidate>,
    pub severity_assessment: SeverityLevel,
    pub recommended_actions: Vec<String>,
    pub suggested_tests: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub confidence_score: f32,
    pub disclaimer: Option<String>,
}

/// Parse a reasoner reply into an [`Assessment`].
///
/// The whole reply is tried as JSON first; models that wrap the object in
/// prose get a second chance via [`first_balanced_object`]. Anything without
/// a recoverable JSON object is a parse failure for the caller's fallback
/// chain to handle.
pub fn parse_assessment(raw: &str) -> Result<Assessment, TriageError> {
    let raw_assessment: RawAssessment = match serde_json::from_str(raw.trim()) {
        Ok(parsed) => parsed,
        Err(_) => {
            let object = first_balanced_object(raw).ok_or_else(|| {
                TriageError::ResponseParsing("no JSON object in reasoner reply".into())
            })?;
            serde_json::from_str(object)
                .map_err(|e| TriageError::ResponseParsing(e.to_string()))?
        }
    };

    Ok(Assessment {
        probable_diagnoses: parse_candidates_lenient(&raw_assessment.probable_diagnoses),
        severity_assessment: raw_assessment
            .severity_assessment
            .as_deref()
            .and_then(SeverityLevel::from_label)
            .unwrap_or_default(),
        recommended_actions: raw_assessment.recommended_actions,
        suggested_tests: raw_assessment.suggested_tests,
        urgency_level: raw_assessment
            .urgency_level
            .as_deref()
            .and_then(UrgencyLevel::from_label)
            .unwrap_or_default(),
        confidence_score: raw_assessment.confidence_score.clamp(0.0, 1.0),
        disclaimer: raw_assessment.disclaimer.filter(|d| !d.trim().is_empty()),
    })
}

/// Wire shape of the reasoner's JSON reply. Every field is optional so a
/// partially-conforming reply still parses.
#[derive(Deserialize)]
struct RawAssessment {
    #[serde(default)]
    probable_diagnoses: Vec<serde_json::Value>,
    #[serde(default)]
    severity_assessment: Option<String>,
    #[serde(default)]
    recommended_actions: Vec<String>,
    #[serde(default)]
    suggested_tests: Vec<String>,
    #[serde(default)]
    urgency_level: Option<String>,
    #[serde(default = "default_confidence")]
    confidence_score: f32,
    #[serde(default)]
    disclaimer: Option<String>,
}

fn default_confidence() -> f32 {
    0.5
}

#[derive(Deserialize)]
struct RawCandidate {
    condition: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    source: Option<CandidateSource>,
}

/// Parse candidate entries leniently: items that fail to deserialize are
/// skipped, not fatal.
fn parse_candidates_lenient(items: &[serde_json::Value]) -> Vec<DiagnosisCandidate> {
    items
        .iter()
        .filter_map(|value| serde_json::from_value::<RawCandidate>(value.clone()).ok())
        .map(|raw| DiagnosisCandidate {
            condition: raw.condition,
            confidence: raw.confidence.clamp(0.0, 1.0),
            source: raw.source.unwrap_or_default(),
        })
        .collect()
}

/// Locate the first balanced `{...}` object in free text, respecting string
/// literals and escapes.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}
