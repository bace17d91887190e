//! Stage 2: rubric matching.
//!
//! First pass links the case's symptom codes against rubrics with
//! explicit symptom links. If that yields nothing, a text-similarity
//! fallback runs against a single reference source using a strict-to-
//! loose ladder: exact equality (100), whole-word match (90), substring
//! containment (70), prefix overlap for compound terms (50). Strengths
//! below the configured floor are discarded.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::db::ReferenceStore;
use crate::models::Rubric;

use super::types::{EngineError, NormalizedCaseProfile, RubricMapping, SelectionPath};

const STRENGTH_EXACT: f64 = 100.0;
const STRENGTH_WORD: f64 = 90.0;
const STRENGTH_SUBSTRING: f64 = 70.0;
const STRENGTH_PREFIX: f64 = 50.0;

/// Minimum word length considered significant for probing and prefix
/// comparison.
const SIGNIFICANT_WORD_LEN: usize = 4;

/// Match the normalized case onto rubrics, sorted by confidence
/// descending. Rubrics below the auto-select threshold are still
/// returned, just not flagged.
pub fn match_rubrics(
    store: &dyn ReferenceStore,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> Result<Vec<RubricMapping>, EngineError> {
    let codes = profile.symptom_codes();
    let linked = store.rubrics_linking_any(&codes)?;

    let mut mappings: Vec<RubricMapping> = linked
        .into_iter()
        .map(|rubric| {
            let matched: Vec<String> = rubric
                .linked_symptom_codes
                .iter()
                .filter(|c| codes.contains(c))
                .cloned()
                .collect();
            let confidence = if rubric.linked_symptom_codes.is_empty() {
                0.0
            } else {
                matched.len() as f64 / rubric.linked_symptom_codes.len() as f64 * 100.0
            };
            RubricMapping {
                auto_selected: confidence >= config.auto_select_threshold,
                rubric,
                matched_symptom_codes: matched,
                confidence,
            }
        })
        .collect();

    if mappings.is_empty() && profile.symptom_count() > 0 {
        tracing::debug!(
            repertory = %config.primary_repertory,
            "No linked rubrics; falling back to text matching"
        );
        mappings = match_by_text(store, profile, config)?;
    }

    sort_by_confidence(&mut mappings);
    Ok(mappings)
}

/// Apply the selection policy to confidence-sorted mappings. The top-N
/// fallback is mandatory policy: free text frequently fails the strict
/// threshold, and a caller must still get a workable rubric set.
pub fn select_rubrics(
    mappings: &[RubricMapping],
    config: &EngineConfig,
) -> (Vec<RubricMapping>, SelectionPath) {
    let auto: Vec<RubricMapping> = mappings.iter().filter(|m| m.auto_selected).cloned().collect();
    if !auto.is_empty() {
        return (auto, SelectionPath::Resolved);
    }
    if !mappings.is_empty() {
        let take = config.fallback_rubric_count.min(mappings.len());
        return (mappings[..take].to_vec(), SelectionPath::FallbackUsed);
    }
    (Vec::new(), SelectionPath::Unresolved)
}

fn sort_by_confidence(mappings: &mut [RubricMapping]) {
    mappings.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.rubric.text.cmp(&b.rubric.text))
    });
}

/// Text fallback, restricted to the primary repertory to avoid
/// cross-source noise.
fn match_by_text(
    store: &dyn ReferenceStore,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) -> Result<Vec<RubricMapping>, EngineError> {
    let mut candidates: HashMap<Uuid, Rubric> = HashMap::new();
    for symptom in profile.all_symptoms() {
        for probe in text_probes(&symptom.name) {
            for rubric in store.rubrics_matching_text(&config.primary_repertory, &probe)? {
                candidates.entry(rubric.id).or_insert(rubric);
            }
        }
    }

    let total = profile.symptom_count() as f64;
    let mut mappings = Vec::new();
    for rubric in candidates.into_values() {
        let mut matched_codes = Vec::new();
        let mut strengths = Vec::new();
        for symptom in profile.all_symptoms() {
            let strength = match_strength(&symptom.name, &rubric.text);
            if strength >= config.min_match_strength {
                matched_codes.push(symptom.code.clone());
                strengths.push(strength);
            }
        }
        if strengths.is_empty() {
            continue;
        }

        let average = strengths.iter().sum::<f64>() / strengths.len() as f64;
        let mut confidence = average * (strengths.len() as f64 / total);
        let strong = strengths
            .iter()
            .filter(|&&s| s > config.strong_match_strength)
            .count();
        if strong > 1 {
            confidence *= config.multi_match_boost;
        }
        let confidence = confidence.min(100.0);

        mappings.push(RubricMapping {
            auto_selected: confidence >= config.auto_select_threshold,
            rubric,
            matched_symptom_codes: matched_codes,
            confidence,
        });
    }
    Ok(mappings)
}

/// Store probes for one symptom: the full phrase, each significant word,
/// and each significant word's prefix (so prefix-only matches are still
/// fetched as candidates).
fn text_probes(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut probes = vec![lower.clone()];
    for word in significant_words(&lower) {
        let prefix: String = word.chars().take(SIGNIFICANT_WORD_LEN).collect();
        if !probes.contains(&word) {
            probes.push(word);
        }
        if !probes.contains(&prefix) {
            probes.push(prefix);
        }
    }
    probes
}

fn significant_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= SIGNIFICANT_WORD_LEN)
        .map(|w| w.to_string())
        .collect()
}

/// Strict-to-loose match strength between one symptom phrase and one
/// rubric text. Returns 0 below the usable floor.
pub fn match_strength(symptom: &str, rubric_text: &str) -> f64 {
    let s = symptom.trim().to_lowercase();
    let r = rubric_text.trim().to_lowercase();
    if s.is_empty() || r.is_empty() {
        return 0.0;
    }
    if s == r {
        return STRENGTH_EXACT;
    }
    if let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(&s))) {
        if re.is_match(&r) {
            return STRENGTH_WORD;
        }
    }
    if r.contains(&s) || s.contains(&r) {
        return STRENGTH_SUBSTRING;
    }
    if prefix_overlap(&s, &r) {
        return STRENGTH_PREFIX;
    }
    0.0
}

/// Compound-term heuristic: any significant word of the symptom shares a
/// 4-character prefix with any significant word of the rubric.
fn prefix_overlap(symptom: &str, rubric_text: &str) -> bool {
    let rubric_prefixes: Vec<String> = significant_words(rubric_text)
        .iter()
        .map(|w| w.chars().take(SIGNIFICANT_WORD_LEN).collect())
        .collect();
    significant_words(symptom).iter().any(|w| {
        let prefix: String = w.chars().take(SIGNIFICANT_WORD_LEN).collect();
        rubric_prefixes.contains(&prefix)
    })
}
