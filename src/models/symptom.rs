use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::SymptomCategory;

/// A reference symptom: the canonical vocabulary entry a raw case entry
/// resolves against. Read-only from the pipeline's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symptom {
    pub id: Uuid,
    /// Canonical code, unique across the reference set (e.g. "MEN-ANX-01").
    pub code: String,
    pub name: String,
    pub category: SymptomCategory,
    pub synonyms: Vec<String>,
}

impl Symptom {
    /// Case-insensitive match against name or any synonym.
    pub fn matches_name(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.name.to_lowercase() == lower
            || self.synonyms.iter().any(|s| s.to_lowercase() == lower)
    }
}
