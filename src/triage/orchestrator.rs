use chrono::Utc;

use crate::models::enums::{CandidateSource, SeverityLevel, UrgencyLevel};
use crate::models::{DiagnosisCandidate, DiagnosisResponse, MedicalCase, PatientHistory, SymptomRequest};

use super::context::{build_evidence_context, TRIAGE_SYSTEM_PROMPT};
use super::knowledge::{SymptomCategory, SymptomKnowledge};
use super::parser::{parse_assessment, Assessment};
use super::reasoner::Reasoner;

/// Default disclaimer when the reasoner supplies none.
const DEFAULT_DISCLAIMER: &str =
    "This analysis is for informational purposes only and should not replace professional medical advice.";

/// Disclaimer for the minimal fallback path.
const FALLBACK_DISCLAIMER: &str =
    "This is a basic symptom assessment. Please consult a healthcare professional for proper medical evaluation.";

const DEFAULT_ACTION: &str = "Consult a healthcare provider";

/// Fixed confidence for rule-derived candidates.
const RULE_CONFIDENCE: f32 = 0.5;

/// How many conditions each matched category may contribute.
const RULE_CANDIDATES_PER_CATEGORY: usize = 2;

/// Diagnosis orchestrator: evidence context → primary inference →
/// rule-based enrichment → minimal fallback.
///
/// `analyze` always produces a terminal response. Reasoner failures,
/// timeouts and unparseable replies are recovered internally and never
/// surface to the caller; the response degrades in confidence and
/// specificity instead.
pub struct TriagePipeline<R: Reasoner> {
    reasoner: R,
    knowledge: SymptomKnowledge,
}

impl<R: Reasoner> TriagePipeline<R> {
    pub fn new(reasoner: R, knowledge: SymptomKnowledge) -> Self {
        Self { reasoner, knowledge }
    }

    pub fn knowledge(&self) -> &SymptomKnowledge {
        &self.knowledge
    }

    pub fn reasoner(&self) -> &R {
        &self.reasoner
    }

    /// Analyze symptoms against the evidence available for this request.
    pub fn analyze(
        &self,
        request: &SymptomRequest,
        history: Option<&PatientHistory>,
        similar_cases: &[MedicalCase],
    ) -> DiagnosisResponse {
        // Step 1: Assemble the evidence context
        let context = build_evidence_context(request, history, similar_cases);

        // Step 2: Primary inference
        let assessment = match self.reasoner.infer(TRIAGE_SYSTEM_PROMPT, &context) {
            Ok(raw) => match parse_assessment(&raw) {
                Ok(assessment) => Some(assessment),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unparseable reasoner reply");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "primary inference failed");
                None
            }
        };

        // Step 3: Rule-based category lookup, computed regardless of step 2
        let matched = self.knowledge.match_categories(&request.symptoms);

        // Step 4: Pick the recovery path
        match assessment {
            Some(assessment) => self.respond_from_assessment(assessment, &matched),
            None if !matched.is_empty() => {
                tracing::info!(
                    categories = matched.len(),
                    "falling back to the rule-based symptom table"
                );
                self.respond_from_rules(&matched)
            }
            None => {
                tracing::info!("no inference and no category match, minimal fallback");
                self.minimal_response(request.severity_level)
            }
        }
    }

    /// Inference succeeded. Rule-derived candidates only fill an empty list;
    /// a populated one is left untouched.
    fn respond_from_assessment(
        &self,
        assessment: Assessment,
        matched: &[&SymptomCategory],
    ) -> DiagnosisResponse {
        let probable_diagnoses = if assessment.probable_diagnoses.is_empty() {
            rule_candidates(matched)
        } else {
            assessment.probable_diagnoses
        };

        let recommended_actions = non_empty_actions(assessment.recommended_actions);

        DiagnosisResponse {
            probable_diagnoses,
            severity_assessment: assessment.severity_assessment,
            recommended_actions,
            suggested_tests: assessment.suggested_tests,
            urgency_level: assessment.urgency_level,
            confidence_score: assessment.confidence_score.clamp(0.0, 1.0),
            disclaimer: assessment
                .disclaimer
                .unwrap_or_else(|| DEFAULT_DISCLAIMER.to_string()),
            generated_at: Utc::now(),
        }
    }

    /// Inference failed but the symptom table matched.
    fn respond_from_rules(&self, matched: &[&SymptomCategory]) -> DiagnosisResponse {
        DiagnosisResponse {
            probable_diagnoses: rule_candidates(matched),
            severity_assessment: SeverityLevel::Medium,
            recommended_actions: vec![DEFAULT_ACTION.to_string()],
            suggested_tests: Vec::new(),
            urgency_level: UrgencyLevel::WithinDays,
            confidence_score: RULE_CONFIDENCE,
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            generated_at: Utc::now(),
        }
    }

    /// Last resort: no inference, no keyword match. No external
    /// dependencies, cannot fail.
    fn minimal_response(&self, severity: SeverityLevel) -> DiagnosisResponse {
        DiagnosisResponse {
            probable_diagnoses: vec![DiagnosisCandidate {
                condition: "Symptom assessment".to_string(),
                confidence: 0.3,
                source: CandidateSource::Fallback,
            }],
            severity_assessment: severity,
            recommended_actions: vec![
                "Consult a healthcare provider for proper diagnosis".to_string(),
                "Monitor symptoms for changes".to_string(),
                "Seek emergency care if symptoms worsen".to_string(),
            ],
            suggested_tests: vec!["Physical examination by healthcare provider".to_string()],
            urgency_level: UrgencyLevel::WithinDays,
            confidence_score: 0.3,
            disclaimer: FALLBACK_DISCLAIMER.to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// Up to two conditions per matched category, deduplicated by condition name
/// (the same condition listed under two categories appears once).
fn rule_candidates(matched: &[&SymptomCategory]) -> Vec<DiagnosisCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut candidates = Vec::new();

    for category in matched {
        for condition in category.conditions.iter().take(RULE_CANDIDATES_PER_CATEGORY) {
            if seen.insert(condition.as_str()) {
                candidates.push(DiagnosisCandidate {
                    condition: condition.clone(),
                    confidence: RULE_CONFIDENCE,
                    source: CandidateSource::MedicalDatabase,
                });
            }
        }
    }

    candidates
}

fn non_empty_actions(actions: Vec<String>) -> Vec<String> {
    if actions.is_empty() {
        vec![DEFAULT_ACTION.to_string()]
    } else {
        actions
    }
}
