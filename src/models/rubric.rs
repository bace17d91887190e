use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repertory entry. When `linked_symptom_codes` is empty the rubric text
/// itself is the matching surface; matching must never skip such rubrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    pub id: Uuid,
    /// Reference source this rubric belongs to (e.g. "kent").
    pub repertory: String,
    pub chapter: String,
    pub text: String,
    pub linked_symptom_codes: Vec<String>,
}

/// Grade mapping row: how strongly `repertory` associates `remedy_id`
/// with `rubric_id`. Grade runs 1..=4, 4 strongest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricGrade {
    pub rubric_id: Uuid,
    pub remedy_id: Uuid,
    pub grade: u8,
    pub repertory: String,
}
