//! Engine configuration: every tunable weight, multiplier, and threshold
//! used by the scoring pipeline lives here, so the formulas themselves stay
//! declarative and independently testable. Defaults reflect classical
//! repertorization practice (mental symptoms outweigh general, general
//! outweigh local).

use serde::Deserialize;

use crate::models::enums::SymptomCategory;

/// Per-category default symptom weights. Mental must stay strictly
/// heaviest, then general, then modality, then particular.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SymptomWeights {
    pub mental: f64,
    pub general: f64,
    pub modality: f64,
    pub particular: f64,
}

impl Default for SymptomWeights {
    fn default() -> Self {
        Self {
            mental: 3.0,
            general: 2.0,
            modality: 1.5,
            particular: 1.0,
        }
    }
}

impl SymptomWeights {
    pub fn for_category(&self, category: SymptomCategory) -> f64 {
        match category {
            SymptomCategory::Mental => self.mental,
            SymptomCategory::General => self.general,
            SymptomCategory::Modality => self.modality,
            SymptomCategory::Particular => self.particular,
        }
    }
}

/// All pipeline tunables in one deserializable structure. A caller can
/// load this from file or environment; `Default` carries the documented
/// values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reference source used for text-fallback matching. Matching stays
    /// within one source at a time to avoid cross-source noise.
    pub primary_repertory: String,
    pub symptom_weights: SymptomWeights,
    /// Indexed by grade − 1. Non-decreasing: higher grades contribute
    /// disproportionately more than linearly.
    pub grade_multipliers: [f64; 4],

    // Rubric matching
    pub min_match_strength: f64,
    pub strong_match_strength: f64,
    pub multi_match_boost: f64,
    pub auto_select_threshold: f64,
    /// Top-N fallback size when nothing clears the auto-select threshold.
    pub fallback_rubric_count: usize,

    // Scoring bonuses
    pub constitution_mental_bonus: f64,
    pub constitution_general_bonus: f64,
    pub modality_worse_bonus: f64,
    pub modality_better_bonus: f64,
    pub pathology_bonus: f64,
    pub keynote_bonus: f64,
    pub keynote_mental_multiplier: f64,
    pub coverage_high_fraction: f64,
    pub coverage_high_bonus: f64,
    pub coverage_mid_fraction: f64,
    pub coverage_mid_bonus: f64,

    // Confidence classification
    pub confidence_medium: f64,
    pub confidence_high: f64,
    pub confidence_very_high: f64,
    /// A remedy supported by at least this many rubrics is upgraded from
    /// medium to high confidence; rubric breadth is itself evidentiary.
    pub breadth_rubric_count: usize,

    // Clinical adjustments
    pub acute_boost: f64,
    pub chronic_constitutional_boost: f64,
    pub mental_dominance_boost: f64,
    pub constitution_bonus_threshold: f64,

    // Contradiction screening
    pub incompatibility_penalty: f64,
    pub repetition_penalty: f64,
    pub history_lookback_days: i64,

    // Suggestion assembly
    pub max_suggestions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_repertory: "kent".into(),
            symptom_weights: SymptomWeights::default(),
            grade_multipliers: [1.0, 1.1, 1.3, 1.5],

            min_match_strength: 30.0,
            strong_match_strength: 50.0,
            multi_match_boost: 1.2,
            auto_select_threshold: 20.0,
            fallback_rubric_count: 5,

            constitution_mental_bonus: 3.0,
            constitution_general_bonus: 1.5,
            modality_worse_bonus: 2.0,
            modality_better_bonus: 1.0,
            pathology_bonus: 5.0,
            keynote_bonus: 2.0,
            keynote_mental_multiplier: 2.0,
            coverage_high_fraction: 0.7,
            coverage_high_bonus: 10.0,
            coverage_mid_fraction: 0.5,
            coverage_mid_bonus: 5.0,

            confidence_medium: 15.0,
            confidence_high: 35.0,
            confidence_very_high: 60.0,
            breadth_rubric_count: 5,

            acute_boost: 5.0,
            chronic_constitutional_boost: 5.0,
            mental_dominance_boost: 4.0,
            constitution_bonus_threshold: 3.0,

            incompatibility_penalty: 10.0,
            repetition_penalty: 5.0,
            history_lookback_days: 30,

            max_suggestions: 10,
        }
    }
}

impl EngineConfig {
    /// Multiplier for a grade 1..=4. Out-of-range grades are clamped.
    pub fn grade_multiplier(&self, grade: u8) -> f64 {
        let idx = grade.clamp(1, 4) as usize - 1;
        self.grade_multipliers[idx]
    }
}
