use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Polarity, Potency, RemedyKingdom};

/// Better/worse factors associated with a remedy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModalityProfile {
    pub better: Vec<String>,
    pub worse: Vec<String>,
}

impl ModalityProfile {
    pub fn list(&self, polarity: Polarity) -> &[String] {
        match polarity {
            Polarity::Better => &self.better,
            Polarity::Worse => &self.worse,
        }
    }
}

/// A reference remedy. Immutable during scoring; only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remedy {
    pub id: Uuid,
    pub name: String,
    pub kingdom: RemedyKingdom,
    /// Personality/physical-type descriptors used for non-acute matching.
    pub constitution_traits: Vec<String>,
    pub modalities: ModalityProfile,
    pub clinical_indications: Vec<String>,
    /// Distinctive, highly characteristic symptoms of this remedy.
    pub keynotes: Vec<String>,
    /// Names of remedies this one is classically incompatible with.
    pub incompatible_with: Vec<String>,
    pub potencies: Vec<Potency>,
}

impl Remedy {
    /// Case-insensitive incompatibility check by remedy name.
    pub fn is_incompatible_with(&self, other_name: &str) -> bool {
        let lower = other_name.to_lowercase();
        self.incompatible_with
            .iter()
            .any(|n| n.to_lowercase() == lower)
    }
}
