use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::engine::types::{CaseRecord, RemedyDecision, SuccessRate, SymptomRemedyCorrelation};
use crate::models::enums::{OutcomeStatus, Potency};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Space-padded code list so token searches can match on ' CODE '.
fn symptom_codes_column(record: &CaseRecord) -> String {
    format!(" {} ", record.profile.symptom_codes().join(" "))
}

pub fn insert_case_record(conn: &Connection, record: &CaseRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO case_records (id, doctor_id, patient_id, profile_json, symptom_codes,
         selected_rubrics_json, output_json, final_remedy, final_potency, final_repetition,
         decision_notes, outcome, outcome_notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            record.id.to_string(),
            record.doctor_id.to_string(),
            record.patient_id.to_string(),
            serde_json::to_string(&record.profile)?,
            symptom_codes_column(record),
            serde_json::to_string(&record.selected_rubrics)?,
            serde_json::to_string(&record.output)?,
            record.decision.as_ref().map(|d| d.remedy_name.clone()),
            record.decision.as_ref().map(|d| d.potency.as_str()),
            record.decision.as_ref().map(|d| d.repetition.clone()),
            record.decision.as_ref().and_then(|d| d.notes.clone()),
            record.outcome.as_str(),
            record.outcome_notes,
            record.created_at.format(DATETIME_FMT).to_string(),
            record.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

type CaseRecordRow = (
    String, String, String, String,
    String, String,
    Option<String>, Option<String>, Option<String>, Option<String>,
    String, Option<String>, String, String,
);

fn record_from_row(row: CaseRecordRow) -> Result<CaseRecord, DatabaseError> {
    let (
        id, doctor_id, patient_id, profile_json,
        selected_rubrics_json, output_json,
        final_remedy, final_potency, final_repetition, decision_notes,
        outcome, outcome_notes, created_at, updated_at,
    ) = row;

    let decision = match (final_remedy, final_potency) {
        (Some(remedy_name), Some(potency)) => Some(RemedyDecision {
            remedy_name,
            potency: Potency::from_str(&potency)?,
            repetition: final_repetition.unwrap_or_default(),
            notes: decision_notes,
        }),
        _ => None,
    };

    Ok(CaseRecord {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        doctor_id: Uuid::parse_str(&doctor_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_id: Uuid::parse_str(&patient_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        profile: serde_json::from_str(&profile_json)?,
        selected_rubrics: serde_json::from_str(&selected_rubrics_json)?,
        output: serde_json::from_str(&output_json)?,
        decision,
        outcome: OutcomeStatus::from_str(&outcome)?,
        outcome_notes,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&updated_at, DATETIME_FMT)
            .unwrap_or_default(),
    })
}

pub fn get_case_record(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<CaseRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, doctor_id, patient_id, profile_json, selected_rubrics_json,
             output_json, final_remedy, final_potency, final_repetition, decision_notes,
             outcome, outcome_notes, created_at, updated_at
             FROM case_records WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, Option<String>>(8)?,
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, String>(10)?,
                    row.get::<_, Option<String>>(11)?,
                    row.get::<_, String>(12)?,
                    row.get::<_, String>(13)?,
                ))
            },
        )
        .optional()?;
    row.map(record_from_row).transpose()
}

/// Attach a doctor's final decision. Single-row update; fails with
/// `NotFound` when the record does not exist.
pub fn attach_decision(
    conn: &Connection,
    id: Uuid,
    decision: &RemedyDecision,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE case_records
         SET final_remedy = ?2, final_potency = ?3, final_repetition = ?4,
             decision_notes = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            id.to_string(),
            decision.remedy_name,
            decision.potency.as_str(),
            decision.repetition,
            decision.notes,
            updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "case_record".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Record a follow-up outcome. Single-row update, last writer wins.
pub fn update_outcome(
    conn: &Connection,
    id: Uuid,
    outcome: OutcomeStatus,
    notes: Option<&str>,
    updated_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE case_records
         SET outcome = ?2, outcome_notes = ?3, updated_at = ?4
         WHERE id = ?1",
        params![
            id.to_string(),
            outcome.as_str(),
            notes,
            updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "case_record".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Ratio of improved outcomes to decided (non-pending) cases for one
/// remedy, optionally bounded by a creation-time range.
pub fn remedy_success_rate(
    conn: &Connection,
    remedy_name: &str,
    range: Option<(NaiveDateTime, NaiveDateTime)>,
) -> Result<SuccessRate, DatabaseError> {
    let (decided, improved): (u32, u32) = match range {
        Some((from, to)) => conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN outcome = 'improved' THEN 1 ELSE 0 END), 0)
             FROM case_records
             WHERE final_remedy = ?1 AND outcome != 'pending'
               AND created_at >= ?2 AND created_at <= ?3",
            params![
                remedy_name,
                from.format(DATETIME_FMT).to_string(),
                to.format(DATETIME_FMT).to_string(),
            ],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN outcome = 'improved' THEN 1 ELSE 0 END), 0)
             FROM case_records
             WHERE final_remedy = ?1 AND outcome != 'pending'",
            params![remedy_name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?,
    };

    let rate = if decided > 0 {
        f64::from(improved) / f64::from(decided)
    } else {
        0.0
    };

    Ok(SuccessRate {
        remedy_name: remedy_name.to_string(),
        decided,
        improved,
        rate,
    })
}

/// Remedies decided for historical cases containing the given symptom
/// code, with outcome breakdown. Ordered by case count, then name.
pub fn symptom_remedy_correlations(
    conn: &Connection,
    symptom_code: &str,
) -> Result<Vec<SymptomRemedyCorrelation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT final_remedy,
                COUNT(*),
                SUM(CASE WHEN outcome = 'improved' THEN 1 ELSE 0 END),
                SUM(CASE WHEN outcome = 'no_change' THEN 1 ELSE 0 END),
                SUM(CASE WHEN outcome = 'worsened' THEN 1 ELSE 0 END)
         FROM case_records
         WHERE final_remedy IS NOT NULL
           AND symptom_codes LIKE '% ' || ?1 || ' %'
         GROUP BY final_remedy
         ORDER BY COUNT(*) DESC, final_remedy ASC",
    )?;

    let rows = stmt.query_map(params![symptom_code], |row| {
        Ok(SymptomRemedyCorrelation {
            remedy_name: row.get(0)?,
            cases: row.get(1)?,
            improved: row.get(2)?,
            no_change: row.get(3)?,
            worsened: row.get(4)?,
        })
    })?;

    let mut correlations = Vec::new();
    for row in rows {
        correlations.push(row?);
    }
    Ok(correlations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::engine::types::{NormalizedCaseProfile, SuggestionResult, WeightedSymptom};
    use crate::models::enums::SymptomCategory;

    fn make_profile(codes: &[&str]) -> NormalizedCaseProfile {
        NormalizedCaseProfile {
            mental: vec![],
            general: codes
                .iter()
                .map(|c| WeightedSymptom {
                    code: c.to_string(),
                    name: c.to_string(),
                    category: SymptomCategory::General,
                    weight: 2.0,
                    polarity: None,
                    resolved: true,
                })
                .collect(),
            particular: vec![],
            modalities: vec![],
            pathology_tags: vec![],
            is_acute: false,
            is_chronic: false,
        }
    }

    fn make_record(codes: &[&str]) -> CaseRecord {
        let now = NaiveDateTime::parse_from_str("2026-03-01 10:00:00", DATETIME_FMT).unwrap();
        CaseRecord {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            profile: make_profile(codes),
            selected_rubrics: vec![],
            output: SuggestionResult::default(),
            decision: None,
            outcome: OutcomeStatus::Pending,
            outcome_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn decide(conn: &Connection, record: &CaseRecord, remedy: &str, outcome: OutcomeStatus) {
        let now = record.created_at;
        attach_decision(
            conn,
            record.id,
            &RemedyDecision {
                remedy_name: remedy.into(),
                potency: Potency::C30,
                repetition: "Once daily".into(),
                notes: None,
            },
            now,
        )
        .unwrap();
        update_outcome(conn, record.id, outcome, None, now).unwrap();
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let conn = open_memory_database().unwrap();
        let record = make_record(&["GEN-FEV-01"]);
        insert_case_record(&conn, &record).unwrap();

        let found = get_case_record(&conn, record.id).unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert_eq!(found.outcome, OutcomeStatus::Pending);
        assert!(found.decision.is_none());
        assert_eq!(found.profile.symptom_codes(), vec!["GEN-FEV-01"]);
    }

    #[test]
    fn fetch_unknown_record_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_case_record(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn attach_decision_round_trip() {
        let conn = open_memory_database().unwrap();
        let record = make_record(&["GEN-FEV-01"]);
        insert_case_record(&conn, &record).unwrap();

        let decision = RemedyDecision {
            remedy_name: "Belladonna".into(),
            potency: Potency::C200,
            repetition: "Single dose".into(),
            notes: Some("classic picture".into()),
        };
        attach_decision(&conn, record.id, &decision, record.created_at).unwrap();

        let found = get_case_record(&conn, record.id).unwrap().unwrap();
        let stored = found.decision.unwrap();
        assert_eq!(stored.remedy_name, "Belladonna");
        assert_eq!(stored.potency, Potency::C200);
        assert_eq!(stored.notes.as_deref(), Some("classic picture"));
    }

    #[test]
    fn attach_decision_missing_record_not_found() {
        let conn = open_memory_database().unwrap();
        let decision = RemedyDecision {
            remedy_name: "Belladonna".into(),
            potency: Potency::C30,
            repetition: "Once".into(),
            notes: None,
        };
        let err = attach_decision(
            &conn,
            Uuid::new_v4(),
            &decision,
            NaiveDateTime::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn update_outcome_missing_record_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_outcome(
            &conn,
            Uuid::new_v4(),
            OutcomeStatus::Improved,
            None,
            NaiveDateTime::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn success_rate_counts_only_decided() {
        let conn = open_memory_database().unwrap();

        let improved = make_record(&["GEN-FEV-01"]);
        let worsened = make_record(&["GEN-FEV-01"]);
        let pending = make_record(&["GEN-FEV-01"]);
        for r in [&improved, &worsened, &pending] {
            insert_case_record(&conn, r).unwrap();
        }
        decide(&conn, &improved, "Belladonna", OutcomeStatus::Improved);
        decide(&conn, &worsened, "Belladonna", OutcomeStatus::Worsened);
        // `pending` gets a decision but never a followed-up outcome
        attach_decision(
            &conn,
            pending.id,
            &RemedyDecision {
                remedy_name: "Belladonna".into(),
                potency: Potency::C30,
                repetition: "Once".into(),
                notes: None,
            },
            pending.created_at,
        )
        .unwrap();

        let rate = remedy_success_rate(&conn, "Belladonna", None).unwrap();
        assert_eq!(rate.decided, 2);
        assert_eq!(rate.improved, 1);
        assert!((rate.rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn success_rate_no_cases_is_zero() {
        let conn = open_memory_database().unwrap();
        let rate = remedy_success_rate(&conn, "Sulphur", None).unwrap();
        assert_eq!(rate.decided, 0);
        assert_eq!(rate.rate, 0.0);
    }

    #[test]
    fn success_rate_respects_time_range() {
        let conn = open_memory_database().unwrap();
        let record = make_record(&["GEN-FEV-01"]);
        insert_case_record(&conn, &record).unwrap();
        decide(&conn, &record, "Belladonna", OutcomeStatus::Improved);

        let before = (
            NaiveDateTime::parse_from_str("2020-01-01 00:00:00", DATETIME_FMT).unwrap(),
            NaiveDateTime::parse_from_str("2020-12-31 00:00:00", DATETIME_FMT).unwrap(),
        );
        let rate = remedy_success_rate(&conn, "Belladonna", Some(before)).unwrap();
        assert_eq!(rate.decided, 0);
    }

    #[test]
    fn correlations_group_by_remedy() {
        let conn = open_memory_database().unwrap();

        let a = make_record(&["MEN-ANX-01", "GEN-FEV-01"]);
        let b = make_record(&["MEN-ANX-01"]);
        let c = make_record(&["PAR-HEAD-01"]);
        for r in [&a, &b, &c] {
            insert_case_record(&conn, r).unwrap();
        }
        decide(&conn, &a, "Aconitum Napellus", OutcomeStatus::Improved);
        decide(&conn, &b, "Aconitum Napellus", OutcomeStatus::NoChange);
        decide(&conn, &c, "Belladonna", OutcomeStatus::Improved);

        let correlations = symptom_remedy_correlations(&conn, "MEN-ANX-01").unwrap();
        assert_eq!(correlations.len(), 1);
        assert_eq!(correlations[0].remedy_name, "Aconitum Napellus");
        assert_eq!(correlations[0].cases, 2);
        assert_eq!(correlations[0].improved, 1);
        assert_eq!(correlations[0].no_change, 1);
    }

    #[test]
    fn correlation_code_match_is_whole_token() {
        let conn = open_memory_database().unwrap();
        let record = make_record(&["MEN-ANX-010"]);
        insert_case_record(&conn, &record).unwrap();
        decide(&conn, &record, "Sulphur", OutcomeStatus::Improved);

        // "MEN-ANX-01" must not match the distinct code "MEN-ANX-010"
        assert!(symptom_remedy_correlations(&conn, "MEN-ANX-01")
            .unwrap()
            .is_empty());
    }
}
