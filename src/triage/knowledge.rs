use std::path::Path;

use serde::{Deserialize, Serialize};

use super::TriageError;

/// One symptom category: keyword set plus the conditions associated with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomCategory {
    pub name: String,
    pub symptoms: Vec<String>,
    pub conditions: Vec<String>,
}

/// The rule-based symptom-to-condition table backing the fallback chain.
///
/// Configuration data, not code: loaded once at startup, either bundled or
/// from an operator-supplied JSON file with the same shape (extendable
/// beyond the default five categories).
#[derive(Debug, Clone)]
pub struct SymptomKnowledge {
    categories: Vec<SymptomCategory>,
}

impl SymptomKnowledge {
    /// The table bundled with the crate.
    pub fn bundled() -> Self {
        let categories: Vec<SymptomCategory> =
            serde_json::from_str(include_str!("../../resources/symptom_categories.json"))
                .expect("bundled symptom table is valid JSON");
        Self { categories }
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TriageError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            TriageError::KnowledgeLoad(path.display().to_string(), e.to_string())
        })?;
        let categories: Vec<SymptomCategory> =
            serde_json::from_str(&json).map_err(|e| TriageError::KnowledgeParse(e.to_string()))?;
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[SymptomCategory] {
        &self.categories
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Categories with at least one keyword appearing in the symptom text.
    /// Matching is case-insensitive substring search; one keyword hit is
    /// enough per category.
    pub fn match_categories(&self, symptoms_text: &str) -> Vec<&SymptomCategory> {
        let lower = symptoms_text.to_lowercase();
        self.categories
            .iter()
            .filter(|category| {
                category
                    .symptoms
                    .iter()
                    .any(|keyword| lower.contains(keyword.as_str()))
            })
            .collect()
    }
}

impl Default for SymptomKnowledge {
    fn default() -> Self {
        Self::bundled()
    }
}
