//! Stage 5: clinical intelligence layer.
//!
//! Additive, idempotent context adjustments on the ranked list. Remedy
//! membership never changes here, and a case with no applicable
//! condition passes through byte-for-byte unchanged — that no-op is
//! contract, not accident.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::Remedy;

use super::types::{NormalizedCaseProfile, RemedyFinalScore};

pub fn apply_clinical_adjustments(
    scores: &mut [RemedyFinalScore],
    remedies: &HashMap<Uuid, Remedy>,
    profile: &NormalizedCaseProfile,
    config: &EngineConfig,
) {
    let mental_dominant = profile.mental_dominant();
    if !profile.is_acute && !profile.is_chronic && !mental_dominant {
        return;
    }

    for score in scores.iter_mut() {
        let mut adjustment = 0.0;

        if profile.is_acute && indicates_acute(remedies.get(&score.remedy_id)) {
            adjustment += config.acute_boost;
        }
        // Constitutional remedies matter more for chronic presentations
        if profile.is_chronic && score.constitution_bonus > config.constitution_bonus_threshold {
            adjustment += config.chronic_constitutional_boost;
        }
        if mental_dominant && score.constitution_bonus > config.constitution_bonus_threshold {
            adjustment += config.mental_dominance_boost;
        }

        // Assignment, not accumulation: re-running the layer is a no-op
        score.clinical_adjustment = adjustment;
        score.recompute_final();
    }
}

fn indicates_acute(remedy: Option<&Remedy>) -> bool {
    remedy.is_some_and(|r| {
        r.clinical_indications
            .iter()
            .any(|i| i.eq_ignore_ascii_case("acute"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{ConfidenceLevel, WeightedSymptom};
    use crate::models::enums::{RemedyKingdom, SymptomCategory};
    use crate::models::ModalityProfile;

    fn make_symptom(code: &str, name: &str, category: SymptomCategory, weight: f64) -> WeightedSymptom {
        WeightedSymptom {
            code: code.into(),
            name: name.into(),
            category,
            weight,
            polarity: None,
            resolved: true,
        }
    }

    fn make_remedy(name: &str, indications: &[&str]) -> Remedy {
        Remedy {
            id: Uuid::new_v4(),
            name: name.into(),
            kingdom: RemedyKingdom::Plant,
            constitution_traits: vec![],
            modalities: ModalityProfile::default(),
            clinical_indications: indications.iter().map(|s| s.to_string()).collect(),
            keynotes: vec![],
            incompatible_with: vec![],
            potencies: vec![],
        }
    }

    fn make_score(remedy: &Remedy, base: f64, constitution: f64) -> RemedyFinalScore {
        let mut score = RemedyFinalScore {
            remedy_id: remedy.id,
            remedy_name: remedy.name.clone(),
            base_score: base,
            constitution_bonus: constitution,
            modality_bonus: 0.0,
            pathology_bonus: 0.0,
            keynote_bonus: 0.0,
            coverage_bonus: 0.0,
            clinical_adjustment: 0.0,
            contradiction_penalty: 0.0,
            final_score: 0.0,
            matched_rubric_texts: vec![],
            matched_symptom_codes: vec![],
            confidence: ConfidenceLevel::Medium,
            warnings: vec![],
        };
        score.recompute_final();
        score
    }

    fn neutral_profile() -> NormalizedCaseProfile {
        NormalizedCaseProfile {
            mental: vec![],
            general: vec![],
            particular: vec![],
            modalities: vec![],
            pathology_tags: vec![],
            is_acute: false,
            is_chronic: false,
        }
    }

    /// Neither acute, nor chronic, nor mental-dominant: output is
    /// byte-for-byte the input.
    #[test]
    fn no_condition_is_exact_no_op() {
        let config = EngineConfig::default();
        let remedy = make_remedy("Sulphur", &["Chronic"]);
        let remedies = HashMap::from([(remedy.id, remedy.clone())]);

        let mut scores = vec![make_score(&remedy, 20.0, 5.0)];
        let before = serde_json::to_string(&scores).unwrap();

        apply_clinical_adjustments(&mut scores, &remedies, &neutral_profile(), &config);
        let after = serde_json::to_string(&scores).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn acute_case_boosts_acute_indicated_remedies() {
        let config = EngineConfig::default();
        let aconite = make_remedy("Aconitum Napellus", &["Acute", "Fever"]);
        let sulphur = make_remedy("Sulphur", &["Chronic", "Skin"]);
        let remedies =
            HashMap::from([(aconite.id, aconite.clone()), (sulphur.id, sulphur.clone())]);

        let mut profile = neutral_profile();
        profile.is_acute = true;

        let mut scores = vec![make_score(&aconite, 20.0, 0.0), make_score(&sulphur, 20.0, 0.0)];
        apply_clinical_adjustments(&mut scores, &remedies, &profile, &config);

        assert_eq!(scores[0].clinical_adjustment, config.acute_boost);
        assert_eq!(scores[0].final_score, 20.0 + config.acute_boost);
        assert_eq!(scores[1].clinical_adjustment, 0.0);
        assert_eq!(scores[1].final_score, 20.0);
    }

    #[test]
    fn chronic_case_boosts_constitutional_remedies() {
        let config = EngineConfig::default();
        let sulphur = make_remedy("Sulphur", &["Chronic"]);
        let bryonia = make_remedy("Bryonia Alba", &["Fever"]);
        let remedies =
            HashMap::from([(sulphur.id, sulphur.clone()), (bryonia.id, bryonia.clone())]);

        let mut profile = neutral_profile();
        profile.is_chronic = true;

        // Sulphur above the constitution threshold, Bryonia below
        let mut scores = vec![
            make_score(&sulphur, 20.0, config.constitution_bonus_threshold + 1.0),
            make_score(&bryonia, 20.0, config.constitution_bonus_threshold),
        ];
        apply_clinical_adjustments(&mut scores, &remedies, &profile, &config);

        assert_eq!(scores[0].clinical_adjustment, config.chronic_constitutional_boost);
        assert_eq!(scores[1].clinical_adjustment, 0.0);
    }

    #[test]
    fn mental_dominance_boosts_constitutional_remedies() {
        let config = EngineConfig::default();
        let phosphorus = make_remedy("Phosphorus", &["Chronic"]);
        let remedies = HashMap::from([(phosphorus.id, phosphorus.clone())]);

        let mut profile = neutral_profile();
        profile.mental = vec![
            make_symptom("M1", "Anxiety", SymptomCategory::Mental, 3.0),
            make_symptom("M2", "Fear of death", SymptomCategory::Mental, 3.0),
        ];
        profile.general = vec![make_symptom("G1", "Restlessness", SymptomCategory::General, 2.0)];
        assert!(profile.mental_dominant());

        let mut scores = vec![make_score(
            &phosphorus,
            20.0,
            config.constitution_bonus_threshold + 2.0,
        )];
        apply_clinical_adjustments(&mut scores, &remedies, &profile, &config);
        assert_eq!(scores[0].clinical_adjustment, config.mental_dominance_boost);
    }

    #[test]
    fn adjustments_are_idempotent() {
        let config = EngineConfig::default();
        let aconite = make_remedy("Aconitum Napellus", &["Acute"]);
        let remedies = HashMap::from([(aconite.id, aconite.clone())]);

        let mut profile = neutral_profile();
        profile.is_acute = true;

        let mut scores = vec![make_score(&aconite, 20.0, 0.0)];
        apply_clinical_adjustments(&mut scores, &remedies, &profile, &config);
        let first = serde_json::to_string(&scores).unwrap();
        apply_clinical_adjustments(&mut scores, &remedies, &profile, &config);
        let second = serde_json::to_string(&scores).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn membership_and_identity_never_change() {
        let config = EngineConfig::default();
        let aconite = make_remedy("Aconitum Napellus", &["Acute"]);
        let remedies = HashMap::from([(aconite.id, aconite.clone())]);

        let mut profile = neutral_profile();
        profile.is_acute = true;

        let mut scores = vec![make_score(&aconite, 20.0, 0.0)];
        let ids_before: Vec<Uuid> = scores.iter().map(|s| s.remedy_id).collect();
        apply_clinical_adjustments(&mut scores, &remedies, &profile, &config);
        let ids_after: Vec<Uuid> = scores.iter().map(|s| s.remedy_id).collect();
        assert_eq!(ids_before, ids_after);
        assert_eq!(
            scores[0].final_score,
            scores[0].base_score + scores[0].bonus_total() - scores[0].contradiction_penalty
        );
    }
}
