use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable medical case: some medical text paired with its embedding
/// and metadata, retrievable as evidence for later queries.
///
/// Cases are created exactly once and never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalCase {
    pub case_id: String,
    pub symptoms_text: String,
    pub diagnosis: String,
    pub treatment: String,
    pub outcome: String,
    pub category: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a full case record. The registry fills in
/// `case_id`, `embedding` and `created_at`.
#[derive(Debug, Clone, Default)]
pub struct CaseDraft {
    pub symptoms_text: String,
    pub diagnosis: String,
    pub treatment: String,
    pub outcome: String,
    pub category: String,
    pub metadata: HashMap<String, String>,
}

impl MedicalCase {
    /// Build a case from a draft, allocating its identity and timestamp.
    pub fn from_draft(draft: CaseDraft, embedding: Vec<f32>) -> Self {
        Self {
            case_id: new_case_id(),
            symptoms_text: draft.symptoms_text,
            diagnosis: draft.diagnosis,
            treatment: draft.treatment,
            outcome: draft.outcome,
            category: draft.category,
            embedding,
            metadata: draft.metadata,
            created_at: Utc::now(),
        }
    }
}

/// Allocate an opaque case identifier: a type tag plus 32 random hex chars.
fn new_case_id() -> String {
    format!("case_{}", Uuid::new_v4().simple())
}
