//! Stage 7: suggestion assembly.
//!
//! Re-sorts by (possibly penalized) final score with a deterministic
//! name tie-break, truncates to the configured maximum, and enriches
//! each survivor with reasoning, potency, and repetition guidance.
//! Empty input yields an empty list and an all-zero summary, never an
//! error.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::enums::Potency;
use crate::models::Remedy;

use super::reasoning::ReasoningTemplates;
use super::types::{
    ConfidenceLevel, NormalizedCaseProfile, RemedyFinalScore, SuggestedRemedy, SuggestionResult,
    SuggestionSummary,
};

/// Potency ladder from gentlest to deepest acting.
const POTENCY_LADDER: [Potency; 4] = [Potency::C6, Potency::C30, Potency::C200, Potency::M1];

pub fn assemble_suggestions(
    mut scores: Vec<RemedyFinalScore>,
    profile: &NormalizedCaseProfile,
    remedies: &HashMap<Uuid, Remedy>,
    config: &EngineConfig,
) -> SuggestionResult {
    let total_remedies = scores.len();

    scores.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.remedy_name.cmp(&b.remedy_name))
    });
    scores.truncate(config.max_suggestions);

    let top: Vec<SuggestedRemedy> = scores
        .into_iter()
        .map(|score| {
            let potency =
                select_potency(profile, score.confidence, remedies.get(&score.remedy_id));
            SuggestedRemedy {
                reasoning: ReasoningTemplates::clinical_reasoning(&score),
                remedy_id: score.remedy_id,
                remedy_name: score.remedy_name,
                final_score: score.final_score,
                confidence: score.confidence,
                potency,
                repetition: repetition_guidance(profile),
                warnings: score.warnings,
            }
        })
        .collect();

    let summary = SuggestionSummary {
        total_remedies,
        high_confidence_count: top
            .iter()
            .filter(|s| s.confidence >= ConfidenceLevel::High)
            .count(),
        warning_count: top.iter().map(|s| s.warnings.len()).sum(),
    };

    SuggestionResult { top, summary }
}

/// Potency by acuity/chronicity, constrained to what the remedy is
/// actually available in: prefer the nearest supported potency at or
/// below the chosen one, else the gentlest supported.
fn select_potency(
    profile: &NormalizedCaseProfile,
    confidence: ConfidenceLevel,
    remedy: Option<&Remedy>,
) -> Potency {
    let preferred = if profile.is_chronic && confidence == ConfidenceLevel::VeryHigh {
        Potency::M1
    } else if profile.is_chronic {
        Potency::C200
    } else if profile.is_acute {
        Potency::C30
    } else {
        Potency::C6
    };

    let Some(remedy) = remedy else {
        return preferred;
    };
    if remedy.potencies.is_empty() || remedy.potencies.contains(&preferred) {
        return preferred;
    }

    let preferred_idx = POTENCY_LADDER
        .iter()
        .position(|p| *p == preferred)
        .unwrap_or(0);
    POTENCY_LADDER[..=preferred_idx]
        .iter()
        .rev()
        .find(|p| remedy.potencies.contains(p))
        .or_else(|| POTENCY_LADDER.iter().find(|p| remedy.potencies.contains(p)))
        .copied()
        .unwrap_or(preferred)
}

fn repetition_guidance(profile: &NormalizedCaseProfile) -> String {
    if profile.is_acute {
        "Every 2 hours for up to 6 doses, then reassess".into()
    } else if profile.is_chronic {
        "Once daily for 3 days, then wait and observe".into()
    } else {
        "Twice daily for 2 days, reassess response".into()
    }
}
