use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::RemedyKingdom;
use crate::models::{ModalityProfile, Remedy};

pub fn insert_remedy(conn: &Connection, remedy: &Remedy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO remedies (id, name, kingdom, constitution_traits, modalities_better,
         modalities_worse, clinical_indications, keynotes, incompatible_with, potencies)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            remedy.id.to_string(),
            remedy.name,
            remedy.kingdom.as_str(),
            serde_json::to_string(&remedy.constitution_traits)?,
            serde_json::to_string(&remedy.modalities.better)?,
            serde_json::to_string(&remedy.modalities.worse)?,
            serde_json::to_string(&remedy.clinical_indications)?,
            serde_json::to_string(&remedy.keynotes)?,
            serde_json::to_string(&remedy.incompatible_with)?,
            serde_json::to_string(&remedy.potencies)?,
        ],
    )?;
    Ok(())
}

type RemedyRow = (
    String, String, String,
    String, String, String,
    String, String, String, String,
);

fn remedy_from_row(row: RemedyRow) -> Result<Remedy, DatabaseError> {
    let (
        id, name, kingdom,
        traits, better, worse,
        indications, keynotes, incompatible, potencies,
    ) = row;
    Ok(Remedy {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name,
        kingdom: RemedyKingdom::from_str(&kingdom)?,
        constitution_traits: serde_json::from_str(&traits)?,
        modalities: ModalityProfile {
            better: serde_json::from_str(&better)?,
            worse: serde_json::from_str(&worse)?,
        },
        clinical_indications: serde_json::from_str(&indications)?,
        keynotes: serde_json::from_str(&keynotes)?,
        incompatible_with: serde_json::from_str(&incompatible)?,
        potencies: serde_json::from_str(&potencies)?,
    })
}

const REMEDY_COLUMNS: &str = "id, name, kingdom, constitution_traits, modalities_better,
     modalities_worse, clinical_indications, keynotes, incompatible_with, potencies";

fn map_remedy_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RemedyRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, String>(3)?,
        row.get::<_, String>(4)?,
        row.get::<_, String>(5)?,
        row.get::<_, String>(6)?,
        row.get::<_, String>(7)?,
        row.get::<_, String>(8)?,
        row.get::<_, String>(9)?,
    ))
}

pub fn get_remedy_by_id(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<Remedy>, DatabaseError> {
    let sql = format!("SELECT {REMEDY_COLUMNS} FROM remedies WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id.to_string()], map_remedy_row)
        .optional()?;
    row.map(remedy_from_row).transpose()
}

pub fn get_remedies_by_ids(
    conn: &Connection,
    ids: &[Uuid],
) -> Result<Vec<Remedy>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT {REMEDY_COLUMNS} FROM remedies WHERE id IN ({placeholders})");
    let id_strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(id_strings.iter()), map_remedy_row)?;

    let mut remedies = Vec::new();
    for row in rows {
        remedies.push(remedy_from_row(row?)?);
    }
    Ok(remedies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Potency;

    fn make_remedy(name: &str) -> Remedy {
        Remedy {
            id: Uuid::new_v4(),
            name: name.into(),
            kingdom: RemedyKingdom::Plant,
            constitution_traits: vec!["restless".into()],
            modalities: ModalityProfile {
                better: vec!["open air".into()],
                worse: vec!["night".into()],
            },
            clinical_indications: vec!["Acute".into(), "Fever".into()],
            keynotes: vec!["Sudden onset".into()],
            incompatible_with: vec![],
            potencies: vec![Potency::C30, Potency::C200],
        }
    }

    #[test]
    fn insert_and_fetch_round_trips_lists() {
        let conn = open_memory_database().unwrap();
        let remedy = make_remedy("Aconitum Napellus");
        insert_remedy(&conn, &remedy).unwrap();

        let found = get_remedy_by_id(&conn, remedy.id).unwrap().unwrap();
        assert_eq!(found.name, "Aconitum Napellus");
        assert_eq!(found.modalities.worse, vec!["night".to_string()]);
        assert_eq!(found.potencies, vec![Potency::C30, Potency::C200]);
    }

    #[test]
    fn fetch_unknown_id_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_remedy_by_id(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn fetch_by_id_set() {
        let conn = open_memory_database().unwrap();
        let a = make_remedy("Aconitum Napellus");
        let b = make_remedy("Belladonna");
        insert_remedy(&conn, &a).unwrap();
        insert_remedy(&conn, &b).unwrap();

        let found = get_remedies_by_ids(&conn, &[a.id, b.id]).unwrap();
        assert_eq!(found.len(), 2);

        assert!(get_remedies_by_ids(&conn, &[]).unwrap().is_empty());
    }
}
