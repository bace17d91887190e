//! Stage 3: remedy pool construction.
//!
//! Scans the grade mappings of the selected rubrics and accumulates one
//! entry per distinct remedy. An empty pool is a caller-visible failure
//! handled by the facade, never silently tolerated.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::RubricGrade;

use super::types::RemedyPoolEntry;

pub fn build_pool(grades: &[RubricGrade]) -> HashMap<Uuid, RemedyPoolEntry> {
    let mut pool: HashMap<Uuid, RemedyPoolEntry> = HashMap::new();
    for row in grades {
        let entry = pool
            .entry(row.remedy_id)
            .or_insert_with(|| RemedyPoolEntry {
                remedy_id: row.remedy_id,
                grades: Vec::new(),
                total_grade: 0,
            });
        entry.grades.push((row.rubric_id, row.grade));
        entry.total_grade += u32::from(row.grade);
    }
    pool
}
