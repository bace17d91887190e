//! Stage 1: case normalization.
//!
//! Resolves free-form or pre-coded entries into canonical weighted
//! symptoms. Unresolvable text is carried through under a generated
//! placeholder code — the case never loses information it cannot
//! classify.

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::db::ReferenceStore;
use crate::models::enums::SymptomCategory;
use crate::models::{CaseInput, RawModality, RawSymptom};

use super::types::{EngineError, NormalizedCaseProfile, WeightedSymptom};

/// Pathology tags that imply an acute presentation even without an
/// explicit "Acute" tag.
const ACUTE_IMPLYING_TAGS: &[&str] = &["fever", "injury", "sudden", "trauma"];

pub fn normalize_case(
    store: &dyn ReferenceStore,
    case: &CaseInput,
    config: &EngineConfig,
) -> Result<NormalizedCaseProfile, EngineError> {
    let mental = normalize_entries(store, &case.mental, SymptomCategory::Mental, config)?;
    let general = normalize_entries(store, &case.general, SymptomCategory::General, config)?;
    let particular =
        normalize_entries(store, &case.particular, SymptomCategory::Particular, config)?;
    let modalities = normalize_modalities(store, &case.modalities, config)?;

    let (is_acute, is_chronic) = derive_acuity(&case.pathology_tags);

    let profile = NormalizedCaseProfile {
        mental,
        general,
        particular,
        modalities,
        pathology_tags: case.pathology_tags.clone(),
        is_acute,
        is_chronic,
    };

    tracing::debug!(
        symptoms = profile.symptom_count(),
        is_acute,
        is_chronic,
        "Case normalized"
    );

    Ok(profile)
}

fn normalize_entries(
    store: &dyn ReferenceStore,
    entries: &[RawSymptom],
    category: SymptomCategory,
    config: &EngineConfig,
) -> Result<Vec<WeightedSymptom>, EngineError> {
    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        let (code, name, resolved) =
            resolve_entry(store, &entry.text, entry.code.as_deref(), category)?;
        normalized.push(WeightedSymptom {
            code,
            name,
            category,
            weight: entry
                .weight
                .unwrap_or_else(|| config.symptom_weights.for_category(category)),
            polarity: None,
            resolved,
        });
    }
    Ok(normalized)
}

fn normalize_modalities(
    store: &dyn ReferenceStore,
    entries: &[RawModality],
    config: &EngineConfig,
) -> Result<Vec<WeightedSymptom>, EngineError> {
    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        let (code, name, resolved) = resolve_entry(
            store,
            &entry.text,
            entry.code.as_deref(),
            SymptomCategory::Modality,
        )?;
        normalized.push(WeightedSymptom {
            code,
            name,
            category: SymptomCategory::Modality,
            weight: entry
                .weight
                .unwrap_or_else(|| config.symptom_weights.for_category(SymptomCategory::Modality)),
            polarity: Some(entry.polarity),
            resolved,
        });
    }
    Ok(normalized)
}

/// Resolution order: explicit code, then the text as a code, then a
/// category-scoped name/synonym lookup, then a placeholder.
fn resolve_entry(
    store: &dyn ReferenceStore,
    text: &str,
    code: Option<&str>,
    category: SymptomCategory,
) -> Result<(String, String, bool), EngineError> {
    if let Some(code) = code {
        if let Some(symptom) = store.symptom_by_code(code)? {
            return Ok((symptom.code, symptom.name, true));
        }
    }
    if let Some(symptom) = store.symptom_by_code(text)? {
        return Ok((symptom.code, symptom.name, true));
    }
    if let Some(symptom) = store.symptom_by_name(text, category)? {
        return Ok((symptom.code, symptom.name, true));
    }
    Ok((placeholder_code(), text.to_string(), false))
}

/// Globally-unique temporary code for unresolvable entries.
fn placeholder_code() -> String {
    format!("UNRES-{}", Uuid::new_v4().simple())
}

fn derive_acuity(tags: &[String]) -> (bool, bool) {
    let mut is_acute = false;
    let mut is_chronic = false;
    for tag in tags {
        let lower = tag.to_lowercase();
        if lower == "acute" || ACUTE_IMPLYING_TAGS.iter().any(|t| lower.contains(t)) {
            is_acute = true;
        }
        if lower == "chronic" {
            is_chronic = true;
        }
    }
    (is_acute, is_chronic)
}
