use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Rubric, RubricGrade};

pub fn insert_rubric(conn: &Connection, rubric: &Rubric) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO rubrics (id, repertory, chapter, text, linked_symptom_codes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            rubric.id.to_string(),
            rubric.repertory,
            rubric.chapter,
            rubric.text,
            serde_json::to_string(&rubric.linked_symptom_codes)?,
        ],
    )?;
    Ok(())
}

type RubricRow = (String, String, String, String, String);

fn rubric_from_row(row: RubricRow) -> Result<Rubric, DatabaseError> {
    let (id, repertory, chapter, text, linked) = row;
    Ok(Rubric {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        repertory,
        chapter,
        text,
        linked_symptom_codes: serde_json::from_str(&linked)?,
    })
}

/// Rubrics whose explicit symptom-link set intersects `codes`.
pub fn get_rubrics_linking_any(
    conn: &Connection,
    codes: &[String],
) -> Result<Vec<Rubric>, DatabaseError> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT id, repertory, chapter, text, linked_symptom_codes
         FROM rubrics WHERE linked_symptom_codes != '[]'",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut rubrics = Vec::new();
    for row in rows {
        let rubric = rubric_from_row(row?)?;
        if rubric
            .linked_symptom_codes
            .iter()
            .any(|c| codes.contains(c))
        {
            rubrics.push(rubric);
        }
    }
    Ok(rubrics)
}

/// Case-insensitive substring search over rubric text, scoped to one
/// reference source.
pub fn find_rubrics_by_text(
    conn: &Connection,
    repertory: &str,
    pattern: &str,
) -> Result<Vec<Rubric>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, repertory, chapter, text, linked_symptom_codes
         FROM rubrics
         WHERE repertory = ?1 AND lower(text) LIKE '%' || lower(?2) || '%'",
    )?;
    let rows = stmt.query_map(params![repertory, pattern], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut rubrics = Vec::new();
    for row in rows {
        rubrics.push(rubric_from_row(row?)?);
    }
    Ok(rubrics)
}

pub fn insert_grade(conn: &Connection, grade: &RubricGrade) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO rubric_remedies (rubric_id, remedy_id, grade, repertory)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            grade.rubric_id.to_string(),
            grade.remedy_id.to_string(),
            grade.grade,
            grade.repertory,
        ],
    )?;
    Ok(())
}

/// All grade mappings whose rubric id is in `rubric_ids`.
pub fn get_grades_for_rubrics(
    conn: &Connection,
    rubric_ids: &[Uuid],
) -> Result<Vec<RubricGrade>, DatabaseError> {
    if rubric_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; rubric_ids.len()].join(", ");
    let sql = format!(
        "SELECT rubric_id, remedy_id, grade, repertory
         FROM rubric_remedies WHERE rubric_id IN ({placeholders})"
    );
    let ids: Vec<String> = rubric_ids.iter().map(|id| id.to_string()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut grades = Vec::new();
    for row in rows {
        let (rubric_id, remedy_id, grade, repertory) = row?;
        grades.push(RubricGrade {
            rubric_id: Uuid::parse_str(&rubric_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            remedy_id: Uuid::parse_str(&remedy_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            grade,
            repertory,
        });
    }
    Ok(grades)
}
