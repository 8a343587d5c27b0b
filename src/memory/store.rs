use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::models::{CaseDraft, ImageAnalysisResult, MedicalCase, PatientHistory};

use super::embedder::TextEmbedder;
use super::index::VectorIndex;
use super::MemoryError;

/// Category tag for cases derived from patient history uploads.
pub const HISTORY_CATEGORY: &str = "patient_history";

/// Case memory: the canonical case registry, the vector index over case
/// embeddings, and retrieval on top of both.
///
/// All registry maps and the index live behind one lock, so a case is never
/// visible in the registry without its index entry or vice versa. Writes
/// (`register_case`, `put_history`) take the write lock for the paired
/// append; reads run concurrently under the read lock. Embedding happens
/// before the lock is taken.
pub struct CaseMemory<E: TextEmbedder> {
    embedder: E,
    inner: RwLock<MemoryInner>,
}

struct MemoryInner {
    index: VectorIndex,
    cases: HashMap<String, MedicalCase>,
    histories: HashMap<String, PatientHistory>,
    image_analyses: HashMap<String, Vec<ImageAnalysisResult>>,
}

impl<E: TextEmbedder> CaseMemory<E> {
    pub fn new(embedder: E) -> Self {
        let dimension = embedder.dimension();
        Self {
            embedder,
            inner: RwLock::new(MemoryInner {
                index: VectorIndex::new(dimension),
                cases: HashMap::new(),
                histories: HashMap::new(),
                image_analyses: HashMap::new(),
            }),
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Number of cases stored (equals the index size).
    pub fn case_count(&self) -> usize {
        self.read().index.size()
    }

    /// Register a bare case: text plus category and metadata.
    pub fn register_case(
        &self,
        case_text: &str,
        category: &str,
        metadata: HashMap<String, String>,
    ) -> Result<MedicalCase, MemoryError> {
        self.register_case_detailed(CaseDraft {
            symptoms_text: case_text.to_string(),
            category: category.to_string(),
            metadata,
            ..CaseDraft::default()
        })
    }

    /// Register a full case record (diagnosis, treatment, outcome included).
    pub fn register_case_detailed(&self, draft: CaseDraft) -> Result<MedicalCase, MemoryError> {
        let embedding = self.embedder.embed(&draft.symptoms_text)?;
        let case = MedicalCase::from_draft(draft, embedding);

        let mut inner = self.write();
        inner
            .index
            .add(case.embedding.clone(), case.case_id.clone())?;
        inner.cases.insert(case.case_id.clone(), case.clone());
        tracing::info!(
            case_id = %case.case_id,
            category = %case.category,
            index_size = inner.index.size(),
            "case registered"
        );
        Ok(case)
    }

    /// Store or replace a patient's history snapshot and append a derived
    /// case to the index.
    ///
    /// Re-uploads replace the snapshot, but every upload leaves its own
    /// immutable case entry behind, so earlier textual snapshots stay
    /// searchable.
    pub fn put_history(&self, mut history: PatientHistory) -> Result<MedicalCase, MemoryError> {
        history.last_updated = Utc::now();

        let case_text = history.canonical_text();
        let embedding = self.embedder.embed(&case_text)?;

        let mut metadata = HashMap::new();
        metadata.insert("patient_id".to_string(), history.patient_id.clone());
        let case = MedicalCase::from_draft(
            CaseDraft {
                symptoms_text: case_text,
                category: HISTORY_CATEGORY.to_string(),
                metadata,
                ..CaseDraft::default()
            },
            embedding,
        );

        let mut inner = self.write();
        inner
            .index
            .add(case.embedding.clone(), case.case_id.clone())?;
        inner.cases.insert(case.case_id.clone(), case.clone());
        inner
            .histories
            .insert(history.patient_id.clone(), history);
        tracing::info!(
            case_id = %case.case_id,
            index_size = inner.index.size(),
            "patient history stored"
        );
        Ok(case)
    }

    pub fn get_history(&self, patient_id: &str) -> Option<PatientHistory> {
        self.read().histories.get(patient_id).cloned()
    }

    pub fn get_case(&self, case_id: &str) -> Option<MedicalCase> {
        self.read().cases.get(case_id).cloned()
    }

    /// Append an image analysis result for a patient.
    pub fn put_image_analysis(&self, patient_id: &str, result: ImageAnalysisResult) {
        self.write()
            .image_analyses
            .entry(patient_id.to_string())
            .or_default()
            .push(result);
    }

    /// All image analyses for a patient, in insertion order.
    pub fn image_analyses(&self, patient_id: &str) -> Vec<ImageAnalysisResult> {
        self.read()
            .image_analyses
            .get(patient_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Find the `top_k` cases most similar to `query_text`, nearest first.
    ///
    /// Embedder failure propagates: an empty result must mean "no similar
    /// cases", never "could not search". Index positions that no longer
    /// resolve to a registered case are silently skipped.
    pub fn find_similar(
        &self,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<MedicalCase>, MemoryError> {
        let query = self.embedder.embed(query_text)?;

        let inner = self.read();
        let hits = inner.index.search(&query, top_k)?;

        let results: Vec<MedicalCase> = hits
            .iter()
            .filter_map(|(position, _)| inner.index.case_id_at(*position))
            .filter_map(|case_id| inner.cases.get(case_id).cloned())
            .collect();

        tracing::debug!(
            requested = top_k,
            found = results.len(),
            "similar case search"
        );
        Ok(results)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryInner> {
        self.inner.read().expect("case memory lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryInner> {
        self.inner.write().expect("case memory lock poisoned")
    }

    /// Drop a case from the registry, leaving its index entry dangling.
    /// Exists only to exercise dangling-position tolerance in tests.
    #[cfg(test)]
    fn forget_case(&self, case_id: &str) {
        self.write().cases.remove(case_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::embedder::HashEmbedder;
    use crate::models::enums::SeverityLevel;
    use crate::models::DetectedCondition;

    fn memory() -> CaseMemory<HashEmbedder> {
        CaseMemory::new(HashEmbedder::with_dimension(32))
    }

    fn history_p1() -> PatientHistory {
        PatientHistory {
            conditions: vec!["Hypertension".into()],
            medications: vec!["Amlodipine".into()],
            ..PatientHistory::new("P1")
        }
    }

    #[test]
    fn registered_case_is_retrievable_by_id() {
        let memory = memory();
        let case = memory
            .register_case("fever and chills", "triage", HashMap::new())
            .unwrap();

        let fetched = memory.get_case(&case.case_id).unwrap();
        assert_eq!(fetched.symptoms_text, "fever and chills");
        assert_eq!(memory.case_count(), 1);
    }

    #[test]
    fn self_retrieval_returns_the_registered_case_first() {
        let memory = memory();
        let case = memory
            .register_case("sharp abdominal pain after meals", "triage", HashMap::new())
            .unwrap();

        let results = memory
            .find_similar("sharp abdominal pain after meals", 1)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].case_id, case.case_id);
    }

    #[test]
    fn empty_memory_returns_empty_results() {
        let memory = memory();
        let results = memory.find_similar("anything at all", 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn results_preserve_distance_order() {
        let memory = memory();
        memory
            .register_case("crushing chest pain radiating to left arm", "c", HashMap::new())
            .unwrap();
        let near = memory
            .register_case("mild headache since morning", "c", HashMap::new())
            .unwrap();

        let results = memory.find_similar("mild headache since morning", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].case_id, near.case_id);
    }

    #[test]
    fn history_upload_appends_a_searchable_case() {
        let memory = memory();
        memory.put_history(history_p1()).unwrap();

        let results = memory
            .find_similar("Conditions: Hypertension | Medications: Amlodipine", 3)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.get("patient_id").unwrap(), "P1");
        assert_eq!(results[0].category, HISTORY_CATEGORY);
    }

    #[test]
    fn history_reupload_replaces_snapshot_but_keeps_both_cases() {
        let memory = memory();
        memory.put_history(history_p1()).unwrap();

        let updated = PatientHistory {
            conditions: vec!["Hypertension".into(), "Asthma".into()],
            ..history_p1()
        };
        memory.put_history(updated).unwrap();

        // Snapshot replaced
        let snapshot = memory.get_history("P1").unwrap();
        assert_eq!(snapshot.conditions.len(), 2);

        // Both textual snapshots remain in the index
        assert_eq!(memory.case_count(), 2);
    }

    #[test]
    fn get_history_for_unknown_patient_is_none() {
        let memory = memory();
        assert!(memory.get_history("nobody").is_none());
        assert!(memory.get_case("case_missing").is_none());
    }

    #[test]
    fn dangling_index_positions_are_silently_skipped() {
        let memory = memory();
        let kept = memory
            .register_case("recurring migraine with aura", "triage", HashMap::new())
            .unwrap();
        let dropped = memory
            .register_case("sprained ankle from running", "triage", HashMap::new())
            .unwrap();

        memory.forget_case(&dropped.case_id);

        let results = memory.find_similar("sprained ankle from running", 2).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].case_id, kept.case_id);
    }

    #[test]
    fn image_analyses_append_in_insertion_order() {
        let memory = memory();
        for condition in ["eczema", "psoriasis"] {
            memory.put_image_analysis(
                "P7",
                ImageAnalysisResult {
                    image_type: "skin".into(),
                    detected_conditions: vec![DetectedCondition {
                        condition: condition.into(),
                        confidence: 0.6,
                    }],
                    recommendations: vec![],
                    severity_level: SeverityLevel::Low,
                    analyzed_at: Utc::now(),
                },
            );
        }

        let analyses = memory.image_analyses("P7");
        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].detected_conditions[0].condition, "eczema");
        assert_eq!(analyses[1].detected_conditions[0].condition, "psoriasis");
        assert!(memory.image_analyses("P8").is_empty());
    }

    #[test]
    fn concurrent_writes_and_searches_keep_the_index_consistent() {
        let memory = std::sync::Arc::new(memory());
        let writers = 4;
        let per_writer = 25;

        std::thread::scope(|scope| {
            for w in 0..writers {
                let memory = std::sync::Arc::clone(&memory);
                scope.spawn(move || {
                    for i in 0..per_writer {
                        memory
                            .register_case(
                                &format!("symptom description {w}-{i}"),
                                "load",
                                HashMap::new(),
                            )
                            .unwrap();
                    }
                });
            }
            for _ in 0..2 {
                let memory = std::sync::Arc::clone(&memory);
                scope.spawn(move || {
                    for _ in 0..50 {
                        let results = memory.find_similar("symptom description", 5).unwrap();
                        assert!(results.len() <= 5);
                    }
                });
            }
        });

        assert_eq!(memory.case_count(), writers * per_writer);
    }
}
