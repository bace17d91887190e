//! Reasoning and warning text builder. One place for all human-readable
//! strings so tone and framing stay consistent across the pipeline.

use super::types::RemedyFinalScore;

pub struct ReasoningTemplates;

impl ReasoningTemplates {
    /// Clinical reasoning for one suggested remedy. Non-empty for every
    /// returned remedy.
    pub fn clinical_reasoning(score: &RemedyFinalScore) -> String {
        let rubric_count = score.matched_rubric_texts.len();
        let mut parts = vec![format!(
            "{} scored {:.1} across {} matched rubric{}",
            score.remedy_name,
            score.final_score,
            rubric_count,
            if rubric_count == 1 { "" } else { "s" },
        )];

        if !score.matched_rubric_texts.is_empty() {
            let leading: Vec<&str> = score
                .matched_rubric_texts
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            parts.push(format!("leading rubrics: {}", leading.join("; ")));
        }
        if score.constitution_bonus > 0.0 {
            parts.push("the constitutional picture agrees with the patient's mental and general state".into());
        }
        if score.modality_bonus > 0.0 {
            parts.push("modality profile agrees with the case".into());
        }
        if score.keynote_bonus > 0.0 {
            parts.push("keynote symptoms are present".into());
        }
        if score.pathology_bonus > 0.0 {
            parts.push("clinical indications cover the reported pathology".into());
        }

        format!(
            "{}. Confidence: {}.",
            parts.join(". "),
            score.confidence.as_str()
        )
    }

    /// Incompatibility warning between two candidates.
    pub fn incompatibility(remedy: &str, other: &str) -> String {
        format!(
            "{remedy} is classically incompatible with {other}; avoid prescribing them \
             together or in close sequence."
        )
    }

    /// Repetition warning against recent patient history.
    pub fn repetition(remedy: &str, days_ago: i64) -> String {
        format!(
            "{remedy} was already given {days_ago} day(s) ago; repeating it this soon \
             may confuse the symptom picture."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::ConfidenceLevel;
    use uuid::Uuid;

    fn make_score(rubrics: &[&str]) -> RemedyFinalScore {
        RemedyFinalScore {
            remedy_id: Uuid::new_v4(),
            remedy_name: "Belladonna".into(),
            base_score: 18.0,
            constitution_bonus: 3.0,
            modality_bonus: 0.0,
            pathology_bonus: 5.0,
            keynote_bonus: 0.0,
            coverage_bonus: 5.0,
            clinical_adjustment: 0.0,
            contradiction_penalty: 0.0,
            final_score: 31.0,
            matched_rubric_texts: rubrics.iter().map(|s| s.to_string()).collect(),
            matched_symptom_codes: vec![],
            confidence: ConfidenceLevel::High,
            warnings: vec![],
        }
    }

    #[test]
    fn reasoning_mentions_remedy_rubrics_and_confidence() {
        let text = ReasoningTemplates::clinical_reasoning(&make_score(&[
            "Fever; heat; intense",
            "Head; pain; throbbing",
        ]));
        assert!(text.contains("Belladonna"));
        assert!(text.contains("2 matched rubrics"));
        assert!(text.contains("Fever; heat; intense"));
        assert!(text.contains("high"));
        assert!(text.contains("constitutional picture"));
        assert!(text.contains("pathology"));
    }

    #[test]
    fn reasoning_never_empty_even_without_rubrics() {
        let text = ReasoningTemplates::clinical_reasoning(&make_score(&[]));
        assert!(!text.is_empty());
        assert!(text.contains("0 matched rubrics"));
    }

    #[test]
    fn warning_templates_name_both_parties() {
        let text = ReasoningTemplates::incompatibility("Apis Mellifica", "Rhus Toxicodendron");
        assert!(text.contains("Apis Mellifica") && text.contains("Rhus Toxicodendron"));

        let text = ReasoningTemplates::repetition("Sulphur", 12);
        assert!(text.contains("Sulphur") && text.contains("12"));
    }
}
