//! Stage 4: weighted scoring.
//!
//! Base score per remedy is Σ grade × matched-symptom weight × grade
//! multiplier over its contributing rubrics, plus five independent
//! bonuses. The contradiction penalty is initialized to zero here and
//! finalized by the contradiction engine.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::enums::Polarity;
use crate::models::Remedy;

use super::types::{
    ConfidenceLevel, NormalizedCaseProfile, RemedyFinalScore, RemedyPoolEntry, RubricMapping,
    WeightedSymptom,
};

/// Score every pooled remedy against the case. Output is sorted by final
/// score descending, remedy name ascending on ties.
pub fn score_pool(
    pool: &HashMap<Uuid, RemedyPoolEntry>,
    remedies: &HashMap<Uuid, Remedy>,
    selected: &[RubricMapping],
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> Vec<RemedyFinalScore> {
    let rubric_index: HashMap<Uuid, &RubricMapping> =
        selected.iter().map(|m| (m.rubric.id, m)).collect();

    let mut scores = Vec::with_capacity(pool.len());
    for entry in pool.values() {
        let Some(remedy) = remedies.get(&entry.remedy_id) else {
            tracing::warn!(remedy_id = %entry.remedy_id, "Pooled remedy missing from reference data");
            continue;
        };

        let mut base_score = 0.0;
        let mut matched_rubric_texts = Vec::new();
        let mut matched_codes: BTreeSet<String> = BTreeSet::new();
        for (rubric_id, grade) in &entry.grades {
            let mapping = rubric_index.get(rubric_id);
            let weight = mapping
                .map(|m| matched_symptom_weight(m, profile))
                .filter(|w| *w > 0.0)
                .unwrap_or(1.0);
            base_score += f64::from(*grade) * weight * config.grade_multiplier(*grade);
            if let Some(m) = mapping {
                matched_rubric_texts.push(m.rubric.text.clone());
                matched_codes.extend(m.matched_symptom_codes.iter().cloned());
            }
        }

        let mut score = RemedyFinalScore {
            remedy_id: remedy.id,
            remedy_name: remedy.name.clone(),
            base_score,
            constitution_bonus: constitution_bonus(remedy, profile, config),
            modality_bonus: modality_bonus(remedy, profile, config),
            pathology_bonus: pathology_bonus(remedy, profile, config),
            keynote_bonus: keynote_bonus(remedy, profile, config),
            coverage_bonus: coverage_bonus(&matched_codes, profile, config),
            clinical_adjustment: 0.0,
            contradiction_penalty: 0.0,
            final_score: 0.0,
            matched_rubric_texts,
            matched_symptom_codes: matched_codes.into_iter().collect(),
            confidence: ConfidenceLevel::Low,
            warnings: Vec::new(),
        };
        score.recompute_final();
        score.confidence = classify_confidence(score.final_score, entry.grades.len(), config);
        scores.push(score);
    }

    scores.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.remedy_name.cmp(&b.remedy_name))
    });
    scores
}

/// Weight carried by a rubric: the heaviest case symptom it matched.
fn matched_symptom_weight(mapping: &RubricMapping, profile: &NormalizedCaseProfile) -> f64 {
    mapping
        .matched_symptom_codes
        .iter()
        .filter_map(|code| profile.weight_of(code))
        .fold(0.0, f64::max)
}

/// Case-insensitive containment in either direction.
fn text_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

fn overlaps_any(text: &str, symptoms: &[WeightedSymptom]) -> bool {
    symptoms.iter().any(|s| text_overlap(text, &s.name))
}

/// Constitutional traits overlapping mental or general symptom names;
/// mental overlap weighs more.
fn constitution_bonus(
    remedy: &Remedy,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> f64 {
    let mut bonus = 0.0;
    for constitution_trait in &remedy.constitution_traits {
        if overlaps_any(constitution_trait, &profile.mental) {
            bonus += config.constitution_mental_bonus;
        } else if overlaps_any(constitution_trait, &profile.general) {
            bonus += config.constitution_general_bonus;
        }
    }
    bonus
}

/// Remedy better/worse lists overlapping case modality entries of the
/// same polarity; a worse-match weighs more than a better-match.
fn modality_bonus(
    remedy: &Remedy,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> f64 {
    let mut bonus = 0.0;
    for symptom in &profile.modalities {
        let Some(polarity) = symptom.polarity else {
            continue;
        };
        if remedy
            .modalities
            .list(polarity)
            .iter()
            .any(|m| text_overlap(m, &symptom.name))
        {
            bonus += match polarity {
                Polarity::Worse => config.modality_worse_bonus,
                Polarity::Better => config.modality_better_bonus,
            };
        }
    }
    bonus
}

/// Flat bonus when any clinical indication substring-matches any case
/// pathology tag.
fn pathology_bonus(
    remedy: &Remedy,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> f64 {
    let supported = remedy.clinical_indications.iter().any(|indication| {
        profile
            .pathology_tags
            .iter()
            .any(|tag| text_overlap(indication, tag))
    });
    if supported {
        config.pathology_bonus
    } else {
        0.0
    }
}

/// Keynotes overlapping symptom names; mental overlaps weigh double.
fn keynote_bonus(
    remedy: &Remedy,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> f64 {
    let mut bonus = 0.0;
    for keynote in &remedy.keynotes {
        if overlaps_any(keynote, &profile.mental) {
            bonus += config.keynote_bonus * config.keynote_mental_multiplier;
        } else if overlaps_any(keynote, &profile.general)
            || overlaps_any(keynote, &profile.particular)
        {
            bonus += config.keynote_bonus;
        }
    }
    bonus
}

/// Two-tier step function on the fraction of case symptoms covered by
/// the remedy's matched rubrics.
fn coverage_bonus(
    matched_codes: &BTreeSet<String>,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> f64 {
    let total = profile.symptom_count();
    if total == 0 {
        return 0.0;
    }
    let fraction = matched_codes.len() as f64 / total as f64;
    if fraction >= config.coverage_high_fraction {
        config.coverage_high_bonus
    } else if fraction >= config.coverage_mid_fraction {
        config.coverage_mid_bonus
    } else {
        0.0
    }
}

/// Threshold classification with a breadth upgrade: support from many
/// rubrics is itself evidentiary, so a medium-band remedy backed by
/// enough rubrics is lifted to high.
fn classify_confidence(
    score: f64,
    rubric_count: usize,
    config: &EngineConfig,
) -> ConfidenceLevel {
    let level = if score >= config.confidence_very_high {
        ConfidenceLevel::VeryHigh
    } else if score >= config.confidence_high {
        ConfidenceLevel::High
    } else if score >= config.confidence_medium {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };
    if level == ConfidenceLevel::Medium && rubric_count >= config.breadth_rubric_count {
        ConfidenceLevel::High
    } else {
        level
    }
}
