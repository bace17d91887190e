use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::SymptomCategory;
use crate::models::Symptom;

pub fn insert_symptom(conn: &Connection, symptom: &Symptom) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptoms (id, code, name, category, synonyms)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            symptom.id.to_string(),
            symptom.code,
            symptom.name,
            symptom.category.as_str(),
            serde_json::to_string(&symptom.synonyms)?,
        ],
    )?;
    Ok(())
}

type SymptomRow = (String, String, String, String, String);

fn symptom_from_row(row: SymptomRow) -> Result<Symptom, DatabaseError> {
    let (id, code, name, category, synonyms) = row;
    Ok(Symptom {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        code,
        name,
        category: SymptomCategory::from_str(&category)?,
        synonyms: serde_json::from_str(&synonyms)?,
    })
}

pub fn get_symptom_by_code(
    conn: &Connection,
    code: &str,
) -> Result<Option<Symptom>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, code, name, category, synonyms FROM symptoms WHERE code = ?1",
            params![code],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;
    row.map(symptom_from_row).transpose()
}

/// Case-insensitive name/synonym lookup scoped to one category.
pub fn find_symptom_by_name(
    conn: &Connection,
    name: &str,
    category: SymptomCategory,
) -> Result<Option<Symptom>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, code, name, category, synonyms FROM symptoms WHERE category = ?1",
    )?;
    let rows = stmt.query_map(params![category.as_str()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    for row in rows {
        let symptom = symptom_from_row(row?)?;
        if symptom.matches_name(name) {
            return Ok(Some(symptom));
        }
    }
    Ok(None)
}
