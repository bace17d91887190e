//! Stage 6: contradiction screening.
//!
//! Two independent checks over the adjusted list: classical remedy
//! incompatibilities among the current candidates, and repetition
//! against the patient's recent remedy history. Each hit attaches a
//! typed warning and subtracts a penalty; a clean remedy receives
//! exactly zero of both.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::{HistoryEntry, Remedy};

use super::reasoning::ReasoningTemplates;
use super::types::{RemedyFinalScore, RemedyWarning, WarningKind, WarningSeverity};

pub fn screen_contradictions(
    scores: &mut [RemedyFinalScore],
    remedies: &HashMap<Uuid, Remedy>,
    history: &[HistoryEntry],
    as_of: NaiveDateTime,
    config: &EngineConfig,
) {
    screen_incompatibilities(scores, remedies, config);
    screen_repetitions(scores, history, as_of, config);
}

/// (a) For every pair of candidates, if either lists the other as
/// incompatible, warn and penalize both.
fn screen_incompatibilities(
    scores: &mut [RemedyFinalScore],
    remedies: &HashMap<Uuid, Remedy>,
    config: &EngineConfig,
) {
    let count = scores.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let name_i = scores[i].remedy_name.clone();
            let name_j = scores[j].remedy_name.clone();
            let incompatible = remedies
                .get(&scores[i].remedy_id)
                .is_some_and(|r| r.is_incompatible_with(&name_j))
                || remedies
                    .get(&scores[j].remedy_id)
                    .is_some_and(|r| r.is_incompatible_with(&name_i));
            if !incompatible {
                continue;
            }

            tracing::warn!(
                remedy_a = %name_i,
                remedy_b = %name_j,
                "Incompatible remedy pair in candidate list"
            );

            let (left, right) = scores.split_at_mut(j);
            penalize_incompatible(&mut left[i], &name_j, config);
            penalize_incompatible(&mut right[0], &name_i, config);
        }
    }
}

fn penalize_incompatible(score: &mut RemedyFinalScore, other: &str, config: &EngineConfig) {
    score.warnings.push(RemedyWarning {
        kind: WarningKind::Incompatibility,
        severity: WarningSeverity::High,
        message: ReasoningTemplates::incompatibility(&score.remedy_name, other),
        related_remedy: Some(other.to_string()),
    });
    score.contradiction_penalty += config.incompatibility_penalty;
    score.recompute_final();
}

/// (b) A remedy given within the lookback window is flagged once, using
/// its most recent qualifying entry. Entries at or beyond the boundary
/// are ignored entirely — no partial decay.
fn screen_repetitions(
    scores: &mut [RemedyFinalScore],
    history: &[HistoryEntry],
    as_of: NaiveDateTime,
    config: &EngineConfig,
) {
    let window = Duration::days(config.history_lookback_days);
    for score in scores.iter_mut() {
        let recent = history
            .iter()
            .filter(|entry| entry.remedy_name.eq_ignore_ascii_case(&score.remedy_name))
            .filter(|entry| {
                let age = as_of - entry.taken_at;
                age >= Duration::zero() && age < window
            })
            .max_by_key(|entry| entry.taken_at);

        if let Some(entry) = recent {
            let days_ago = (as_of - entry.taken_at).num_days();
            tracing::warn!(
                remedy = %score.remedy_name,
                days_ago,
                "Remedy repeated within lookback window"
            );
            score.warnings.push(RemedyWarning {
                kind: WarningKind::Repetition,
                severity: WarningSeverity::Medium,
                message: ReasoningTemplates::repetition(&score.remedy_name, days_ago),
                related_remedy: None,
            });
            score.contradiction_penalty += config.repetition_penalty;
            score.recompute_final();
        }
    }
}
