use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Polarity;

/// One raw symptom entry as supplied by the caller. `code` may already
/// carry a canonical code; otherwise `text` is resolved by name/synonym
/// lookup. `weight` overrides the category default when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSymptom {
    pub text: String,
    pub code: Option<String>,
    pub weight: Option<f64>,
}

impl RawSymptom {
    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
            weight: None,
        }
    }

    pub fn coded(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: Some(code.into()),
            weight: None,
        }
    }
}

/// A modality entry additionally carries its better/worse polarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawModality {
    pub text: String,
    pub code: Option<String>,
    pub weight: Option<f64>,
    pub polarity: Polarity,
}

impl RawModality {
    pub fn free_text(text: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            text: text.into(),
            code: None,
            weight: None,
            polarity,
        }
    }
}

/// The structured case object handed to the pipeline: four symptom lists
/// plus free-text pathology tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseInput {
    pub mental: Vec<RawSymptom>,
    pub general: Vec<RawSymptom>,
    pub particular: Vec<RawSymptom>,
    pub modalities: Vec<RawModality>,
    pub pathology_tags: Vec<String>,
}

impl CaseInput {
    pub fn is_empty(&self) -> bool {
        self.mental.is_empty()
            && self.general.is_empty()
            && self.particular.is_empty()
            && self.modalities.is_empty()
    }
}

/// One prior prescription from the patient's history, used by the
/// repetition screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub remedy_name: String,
    pub taken_at: NaiveDateTime,
}

/// Full pipeline request: who is asking, for whom, the case itself, and
/// any known remedy history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub case: CaseInput,
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_case_detected() {
        let case = CaseInput::default();
        assert!(case.is_empty());
    }

    #[test]
    fn case_with_only_modalities_is_not_empty() {
        let case = CaseInput {
            modalities: vec![RawModality::free_text("night", Polarity::Worse)],
            ..Default::default()
        };
        assert!(!case.is_empty());
    }
}
