use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{OutcomeStatus, Polarity, Potency, SymptomCategory};
use crate::models::Rubric;

// ---------------------------------------------------------------------------
// ConfidenceLevel
// ---------------------------------------------------------------------------

/// Four-level confidence classification for a scored remedy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WarningKind {
    Incompatibility,
    Repetition,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incompatibility => "incompatibility",
            Self::Repetition => "repetition",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
}

/// A safety observation attached to one candidate remedy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedyWarning {
    pub kind: WarningKind,
    pub severity: WarningSeverity,
    pub message: String,
    /// The other remedy involved, for incompatibility warnings.
    pub related_remedy: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized case
// ---------------------------------------------------------------------------

/// One resolved, weighted symptom entry. `resolved` is false when the
/// entry carries a generated placeholder code — the case never drops
/// information it cannot classify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedSymptom {
    pub code: String,
    pub name: String,
    pub category: SymptomCategory,
    pub weight: f64,
    /// Set for modality entries only.
    pub polarity: Option<Polarity>,
    pub resolved: bool,
}

/// The per-request normalized case: four ordered weighted symptom lists,
/// pathology tags, and the derived acuity flags. Created once by the
/// normalizer, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedCaseProfile {
    pub mental: Vec<WeightedSymptom>,
    pub general: Vec<WeightedSymptom>,
    pub particular: Vec<WeightedSymptom>,
    pub modalities: Vec<WeightedSymptom>,
    pub pathology_tags: Vec<String>,
    pub is_acute: bool,
    pub is_chronic: bool,
}

impl NormalizedCaseProfile {
    pub fn all_symptoms(&self) -> impl Iterator<Item = &WeightedSymptom> {
        self.mental
            .iter()
            .chain(&self.general)
            .chain(&self.particular)
            .chain(&self.modalities)
    }

    pub fn symptom_count(&self) -> usize {
        self.mental.len() + self.general.len() + self.particular.len() + self.modalities.len()
    }

    pub fn symptom_codes(&self) -> Vec<String> {
        self.all_symptoms().map(|s| s.code.clone()).collect()
    }

    /// Weight of the symptom with the given code, if present.
    pub fn weight_of(&self, code: &str) -> Option<f64> {
        self.all_symptoms().find(|s| s.code == code).map(|s| s.weight)
    }

    /// Mental symptoms form a strict majority of the symptom mix.
    pub fn mental_dominant(&self) -> bool {
        let total = self.symptom_count();
        total > 0 && self.mental.len() * 2 > total
    }
}

// ---------------------------------------------------------------------------
// Rubric matching
// ---------------------------------------------------------------------------

/// One matched rubric with its 0–100 confidence. `auto_selected` is set
/// when confidence clears the configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricMapping {
    pub rubric: Rubric,
    pub matched_symptom_codes: Vec<String>,
    pub confidence: f64,
    pub auto_selected: bool,
}

/// Which selection branch produced the rubric set. Tests assert the path
/// taken, not just the final count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionPath {
    /// Auto-selected rubrics cleared the confidence threshold.
    Resolved,
    /// Nothing cleared the threshold; the top-N fallback was used.
    FallbackUsed,
    /// No rubric matched at all.
    Unresolved,
}

impl SelectionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::FallbackUsed => "fallback_used",
            Self::Unresolved => "unresolved",
        }
    }
}

// ---------------------------------------------------------------------------
// Remedy pool
// ---------------------------------------------------------------------------

/// Accumulator for one candidate remedy while scanning grade mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedyPoolEntry {
    pub remedy_id: Uuid,
    /// (rubric id, grade) pairs contributing to this remedy.
    pub grades: Vec<(Uuid, u8)>,
    pub total_grade: u32,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Fully scored candidate remedy. The clinical layer and contradiction
/// engine mutate score and penalty terms in place; remedy identity and
/// matched sets never change after stage 4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedyFinalScore {
    pub remedy_id: Uuid,
    pub remedy_name: String,
    pub base_score: f64,
    pub constitution_bonus: f64,
    pub modality_bonus: f64,
    pub pathology_bonus: f64,
    pub keynote_bonus: f64,
    pub coverage_bonus: f64,
    pub clinical_adjustment: f64,
    pub contradiction_penalty: f64,
    pub final_score: f64,
    pub matched_rubric_texts: Vec<String>,
    pub matched_symptom_codes: Vec<String>,
    pub confidence: ConfidenceLevel,
    pub warnings: Vec<RemedyWarning>,
}

impl RemedyFinalScore {
    pub fn bonus_total(&self) -> f64 {
        self.constitution_bonus
            + self.modality_bonus
            + self.pathology_bonus
            + self.keynote_bonus
            + self.coverage_bonus
            + self.clinical_adjustment
    }

    /// Re-establish `final = base + Σbonuses − penalty` after any term
    /// changes. Every mutation site must call this.
    pub fn recompute_final(&mut self) {
        self.final_score = self.base_score + self.bonus_total() - self.contradiction_penalty;
    }
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// One remedy in the final result: ranked, explained, dosed, warned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedRemedy {
    pub remedy_id: Uuid,
    pub remedy_name: String,
    pub final_score: f64,
    pub confidence: ConfidenceLevel,
    pub reasoning: String,
    pub potency: Potency,
    pub repetition: String,
    pub warnings: Vec<RemedyWarning>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionSummary {
    /// Candidate count before truncation.
    pub total_remedies: usize,
    /// High or very-high confidence remedies among those returned.
    pub high_confidence_count: usize,
    /// Warnings across all returned remedies.
    pub warning_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub top: Vec<SuggestedRemedy>,
    pub summary: SuggestionSummary,
}

// ---------------------------------------------------------------------------
// Case record
// ---------------------------------------------------------------------------

/// A doctor's final prescription decision on a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedyDecision {
    pub remedy_name: String,
    pub potency: Potency,
    pub repetition: String,
    pub notes: Option<String>,
}

/// The persisted record of one pipeline run. Created once at the end of
/// the pipeline; decision and outcome are attached later by the follow-up
/// operations. Never deleted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub profile: NormalizedCaseProfile,
    pub selected_rubrics: Vec<RubricMapping>,
    pub output: SuggestionResult,
    pub decision: Option<RemedyDecision>,
    pub outcome: OutcomeStatus,
    pub outcome_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Retrospective queries
// ---------------------------------------------------------------------------

/// Historical success rate of one remedy across decided cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessRate {
    pub remedy_name: String,
    /// Decided cases with a recorded (non-pending) outcome.
    pub decided: u32,
    pub improved: u32,
    pub rate: f64,
}

/// Co-occurrence of one symptom code with a decided remedy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomRemedyCorrelation {
    pub remedy_name: String,
    pub cases: u32,
    pub improved: u32,
    pub no_change: u32,
    pub worsened: u32,
}

// ---------------------------------------------------------------------------
// Facade result
// ---------------------------------------------------------------------------

/// What one pipeline run returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case_id: Uuid,
    pub result: SuggestionResult,
    pub selection: SelectionPath,
    pub processing_time_ms: u64,
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum EngineError {
    /// No rubric matched above any usable threshold. Carries enough
    /// context to diagnose a data-coverage gap.
    #[error("no rubrics matched in repertory '{repertory}' for symptoms {symptoms:?}")]
    NoRubricsMatched {
        repertory: String,
        symptoms: Vec<String>,
    },

    /// Selected rubrics carried no grade mappings at all.
    #[error("no remedies are graded against the selected rubrics {rubric_ids:?}")]
    EmptyRemedyPool { rubric_ids: Vec<Uuid> },

    #[error("case record not found: {0}")]
    CaseNotFound(Uuid),

    /// Storage/transport failures propagate unchanged; a suggestion built
    /// from partially available reference data would be misleading.
    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_score() -> RemedyFinalScore {
        RemedyFinalScore {
            remedy_id: Uuid::new_v4(),
            remedy_name: "Aconitum Napellus".into(),
            base_score: 12.0,
            constitution_bonus: 3.0,
            modality_bonus: 2.0,
            pathology_bonus: 0.0,
            keynote_bonus: 4.0,
            coverage_bonus: 5.0,
            clinical_adjustment: 0.0,
            contradiction_penalty: 0.0,
            final_score: 0.0,
            matched_rubric_texts: vec![],
            matched_symptom_codes: vec![],
            confidence: ConfidenceLevel::Low,
            warnings: vec![],
        }
    }

    #[test]
    fn final_score_identity() {
        let mut score = blank_score();
        score.recompute_final();
        assert_eq!(score.final_score, 26.0);

        score.contradiction_penalty = 10.0;
        score.recompute_final();
        assert_eq!(score.final_score, 16.0);

        score.clinical_adjustment = 5.0;
        score.recompute_final();
        assert_eq!(
            score.final_score,
            score.base_score + score.bonus_total() - score.contradiction_penalty
        );
    }

    #[test]
    fn confidence_ordering() {
        assert!(ConfidenceLevel::Low < ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Medium < ConfidenceLevel::High);
        assert!(ConfidenceLevel::High < ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn mental_dominance_requires_strict_majority() {
        let sym = |code: &str, category: SymptomCategory| WeightedSymptom {
            code: code.into(),
            name: code.into(),
            category,
            weight: 1.0,
            polarity: None,
            resolved: true,
        };

        let mut profile = NormalizedCaseProfile {
            mental: vec![
                sym("M1", SymptomCategory::Mental),
                sym("M2", SymptomCategory::Mental),
            ],
            general: vec![sym("G1", SymptomCategory::General)],
            particular: vec![],
            modalities: vec![],
            pathology_tags: vec![],
            is_acute: false,
            is_chronic: false,
        };
        assert!(profile.mental_dominant());

        // Exactly half is not dominance
        profile.general.push(sym("G2", SymptomCategory::General));
        assert!(!profile.mental_dominant());
    }

    #[test]
    fn selection_path_labels() {
        assert_eq!(SelectionPath::Resolved.as_str(), "resolved");
        assert_eq!(SelectionPath::FallbackUsed.as_str(), "fallback_used");
        assert_eq!(SelectionPath::Unresolved.as_str(), "unresolved");
    }
}
