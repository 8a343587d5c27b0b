use std::collections::HashMap;

use crate::config::DEFAULT_TOP_K;
use crate::memory::{CaseMemory, MemoryError, TextEmbedder};
use crate::models::{
    CaseDraft, DiagnosisResponse, ImageAnalysisResult, MedicalCase, PatientHistory, SymptomRequest,
};
use crate::triage::{Reasoner, SymptomKnowledge, TriagePipeline};

/// The engine: case memory plus the triage pipeline behind one interface.
///
/// This is what a transport layer embeds. `diagnose` resolves the patient's
/// history and retrieves similar cases before handing everything to the
/// pipeline; `diagnose_with_cases` accepts pre-fetched inputs instead.
pub struct TriageEngine<E: TextEmbedder, R: Reasoner> {
    memory: CaseMemory<E>,
    pipeline: TriagePipeline<R>,
}

impl<E: TextEmbedder, R: Reasoner> TriageEngine<E, R> {
    pub fn new(embedder: E, reasoner: R, knowledge: SymptomKnowledge) -> Self {
        Self {
            memory: CaseMemory::new(embedder),
            pipeline: TriagePipeline::new(reasoner, knowledge),
        }
    }

    pub fn memory(&self) -> &CaseMemory<E> {
        &self.memory
    }

    pub fn pipeline(&self) -> &TriagePipeline<R> {
        &self.pipeline
    }

    /// Analyze symptoms, resolving history and similar cases from memory.
    ///
    /// Reasoning failures degrade gracefully inside the pipeline; only a
    /// retrieval-infrastructure failure (the embedder) surfaces, since a
    /// silently empty case list would misrepresent the evidence.
    pub fn diagnose(&self, request: &SymptomRequest) -> Result<DiagnosisResponse, MemoryError> {
        let history = request
            .patient_id
            .as_deref()
            .and_then(|patient_id| self.memory.get_history(patient_id));

        let similar_cases = self.memory.find_similar(&request.symptoms, DEFAULT_TOP_K)?;

        Ok(self
            .pipeline
            .analyze(request, history.as_ref(), &similar_cases))
    }

    /// Analyze symptoms with caller-supplied history and similar cases.
    pub fn diagnose_with_cases(
        &self,
        request: &SymptomRequest,
        history: Option<&PatientHistory>,
        similar_cases: &[MedicalCase],
    ) -> DiagnosisResponse {
        self.pipeline.analyze(request, history, similar_cases)
    }

    pub fn find_similar(
        &self,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<MedicalCase>, MemoryError> {
        self.memory.find_similar(query_text, top_k)
    }

    pub fn register_case(
        &self,
        case_text: &str,
        category: &str,
        metadata: HashMap<String, String>,
    ) -> Result<MedicalCase, MemoryError> {
        self.memory.register_case(case_text, category, metadata)
    }

    pub fn register_case_detailed(&self, draft: CaseDraft) -> Result<MedicalCase, MemoryError> {
        self.memory.register_case_detailed(draft)
    }

    pub fn put_history(&self, history: PatientHistory) -> Result<MedicalCase, MemoryError> {
        self.memory.put_history(history)
    }

    pub fn get_history(&self, patient_id: &str) -> Option<PatientHistory> {
        self.memory.get_history(patient_id)
    }

    pub fn get_case(&self, case_id: &str) -> Option<MedicalCase> {
        self.memory.get_case(case_id)
    }

    pub fn put_image_analysis(&self, patient_id: &str, result: ImageAnalysisResult) {
        self.memory.put_image_analysis(patient_id, result)
    }

    pub fn image_analyses(&self, patient_id: &str) -> Vec<ImageAnalysisResult> {
        self.memory.image_analyses(patient_id)
    }

    /// Names of the symptom categories the rule table knows about.
    pub fn symptom_categories(&self) -> Vec<&str> {
        self.pipeline.knowledge().category_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HashEmbedder;
    use crate::models::enums::{CandidateSource, SeverityLevel};
    use crate::triage::TriageError;
    use std::sync::Mutex;

    /// Reasoner that records the prompt it received.
    struct RecordingReasoner {
        reply: Result<String, ()>,
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingReasoner {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                last_prompt: Mutex::new(None),
            }
        }

        fn last_prompt(&self) -> String {
            self.last_prompt.lock().unwrap().clone().unwrap_or_default()
        }
    }

    impl Reasoner for RecordingReasoner {
        fn infer(&self, _system: &str, prompt: &str) -> Result<String, TriageError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.reply
                .clone()
                .map_err(|_| TriageError::Connection("mock reasoner down".into()))
        }
    }

    fn engine(reasoner: RecordingReasoner) -> TriageEngine<HashEmbedder, RecordingReasoner> {
        TriageEngine::new(
            HashEmbedder::with_dimension(32),
            reasoner,
            SymptomKnowledge::bundled(),
        )
    }

    fn flu_reply() -> &'static str {
        r#"{
            "probable_diagnoses": [{"condition": "influenza", "confidence": 0.8}],
            "severity_assessment": "medium",
            "recommended_actions": ["Rest and fluids"],
            "suggested_tests": [],
            "urgency_level": "routine",
            "confidence_score": 0.8,
            "disclaimer": "Informational only."
        }"#
    }

    #[test]
    fn diagnose_feeds_history_and_similar_cases_to_the_reasoner() {
        let engine = engine(RecordingReasoner::replying(flu_reply()));

        engine
            .put_history(PatientHistory {
                conditions: vec!["Asthma".into()],
                medications: vec!["Salbutamol".into()],
                ..PatientHistory::new("P1")
            })
            .unwrap();
        engine
            .register_case_detailed(CaseDraft {
                symptoms_text: "fever and body aches".into(),
                diagnosis: "influenza".into(),
                outcome: "recovered".into(),
                category: "triage".into(),
                ..CaseDraft::default()
            })
            .unwrap();

        let request = SymptomRequest {
            patient_id: Some("P1".into()),
            ..SymptomRequest::new("fever and body aches")
        };
        let response = engine.diagnose(&request).unwrap();

        assert_eq!(response.probable_diagnoses[0].condition, "influenza");

        let seen = engine.pipeline().reasoner().last_prompt();
        assert!(seen.contains("Conditions: Asthma"));
        assert!(seen.contains("fever and body aches | influenza | recovered"));
    }

    #[test]
    fn diagnose_on_empty_memory_still_answers() {
        let engine = engine(RecordingReasoner::failing());
        let request = SymptomRequest {
            severity_level: SeverityLevel::High,
            ..SymptomRequest::new("severe chest pain")
        };

        let response = engine.diagnose(&request).unwrap();
        assert!(!response.probable_diagnoses.is_empty());
        assert!(response
            .probable_diagnoses
            .iter()
            .all(|c| c.source == CandidateSource::MedicalDatabase));
    }

    #[test]
    fn diagnose_propagates_embedding_failure() {
        let engine = engine(RecordingReasoner::replying(flu_reply()));
        let request = SymptomRequest::new("   ");

        let result = engine.diagnose(&request);
        assert!(matches!(result, Err(MemoryError::Embedding(_))));
    }

    #[test]
    fn symptom_categories_lists_the_table() {
        let engine = engine(RecordingReasoner::failing());
        assert_eq!(engine.symptom_categories().len(), 5);
    }
}
