//! Stage 8: outcome hook.
//!
//! One create-only insert per pipeline run, plus the follow-up
//! operations a doctor performs later: attaching a final decision,
//! recording the outcome, and the two retrospective queries. Follow-ups
//! report "record does not exist" distinctly from storage failures.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::db::{CaseStore, DatabaseError};
use crate::models::enums::OutcomeStatus;

use super::types::{
    CaseRecord, EngineError, RemedyDecision, SuccessRate, SymptomRemedyCorrelation,
};

/// Persist one case record. Insert-only; no coordination with concurrent
/// runs is needed.
pub fn persist_case(store: &dyn CaseStore, record: &CaseRecord) -> Result<(), EngineError> {
    store.insert_case(record)?;
    tracing::debug!(case_id = %record.id, "Case record persisted");
    Ok(())
}

/// Attach a doctor's final remedy decision to an existing record.
pub fn attach_decision(
    store: &dyn CaseStore,
    case_id: Uuid,
    decision: &RemedyDecision,
    decided_at: NaiveDateTime,
) -> Result<(), EngineError> {
    store
        .attach_decision(case_id, decision, decided_at)
        .map_err(|e| map_not_found(e, case_id))?;
    tracing::info!(
        case_id = %case_id,
        remedy = %decision.remedy_name,
        potency = decision.potency.as_str(),
        "Final remedy decision recorded"
    );
    Ok(())
}

/// Update the follow-up outcome on an existing record. Last writer wins.
pub fn record_outcome(
    store: &dyn CaseStore,
    case_id: Uuid,
    status: OutcomeStatus,
    notes: Option<&str>,
    recorded_at: NaiveDateTime,
) -> Result<(), EngineError> {
    store
        .update_outcome(case_id, status, notes, recorded_at)
        .map_err(|e| map_not_found(e, case_id))?;
    tracing::info!(case_id = %case_id, outcome = status.as_str(), "Case outcome recorded");
    Ok(())
}

/// Historical success rate for one remedy, optionally time-bounded.
pub fn remedy_success_rate(
    store: &dyn CaseStore,
    remedy_name: &str,
    range: Option<(NaiveDateTime, NaiveDateTime)>,
) -> Result<SuccessRate, EngineError> {
    Ok(store.remedy_success_rate(remedy_name, range)?)
}

/// Symptom → remedy co-occurrence across historical decided cases.
pub fn symptom_remedy_correlations(
    store: &dyn CaseStore,
    symptom_code: &str,
) -> Result<Vec<SymptomRemedyCorrelation>, EngineError> {
    Ok(store.symptom_remedy_correlations(symptom_code)?)
}

fn map_not_found(err: DatabaseError, case_id: Uuid) -> EngineError {
    match err {
        DatabaseError::NotFound { .. } => EngineError::CaseNotFound(case_id),
        other => EngineError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::engine::types::{NormalizedCaseProfile, SuggestionResult};
    use crate::models::enums::Potency;

    const FMT: &str = "%Y-%m-%d %H:%M:%S";

    fn at(datetime: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(datetime, FMT).unwrap()
    }

    fn empty_profile() -> NormalizedCaseProfile {
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

    fn make_record() -> CaseRecord {
        let now = at("2026-03-01 10:00:00");
        CaseRecord {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            profile: empty_profile(),
            selected_rubrics: vec![],
            output: SuggestionResult::default(),
            decision: None,
            outcome: OutcomeStatus::Pending,
            outcome_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn decision() -> RemedyDecision {
        RemedyDecision {
            remedy_name: "Belladonna".into(),
            potency: Potency::C30,
            repetition: "Once daily".into(),
            notes: None,
        }
    }

    #[test]
    fn persist_then_decide_then_outcome() {
        let store = SqliteStore::open_in_memory().unwrap();
        let record = make_record();
        persist_case(&store, &record).unwrap();

        attach_decision(&store, record.id, &decision(), at("2026-03-02 10:00:00")).unwrap();
        record_outcome(
            &store,
            record.id,
            OutcomeStatus::Improved,
            Some("fever resolved within a day"),
            at("2026-03-09 10:00:00"),
        )
        .unwrap();

        let stored = store.case_by_id(record.id).unwrap().unwrap();
        assert_eq!(stored.decision.unwrap().remedy_name, "Belladonna");
        assert_eq!(stored.outcome, OutcomeStatus::Improved);
        assert_eq!(
            stored.outcome_notes.as_deref(),
            Some("fever resolved within a day")
        );
    }

    #[test]
    fn decision_on_missing_record_is_case_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let missing = Uuid::new_v4();
        let err =
            attach_decision(&store, missing, &decision(), at("2026-03-02 10:00:00")).unwrap_err();
        match err {
            EngineError::CaseNotFound(id) => assert_eq!(id, missing),
            other => panic!("expected CaseNotFound, got {other}"),
        }
    }

    #[test]
    fn outcome_on_missing_record_is_case_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = record_outcome(
            &store,
            Uuid::new_v4(),
            OutcomeStatus::NoChange,
            None,
            at("2026-03-02 10:00:00"),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CaseNotFound(_)));
    }

    #[test]
    fn success_rate_over_recorded_outcomes() {
        let store = SqliteStore::open_in_memory().unwrap();
        for outcome in [
            OutcomeStatus::Improved,
            OutcomeStatus::Improved,
            OutcomeStatus::NoChange,
        ] {
            let record = make_record();
            persist_case(&store, &record).unwrap();
            attach_decision(&store, record.id, &decision(), record.created_at).unwrap();
            record_outcome(&store, record.id, outcome, None, record.created_at).unwrap();
        }

        let rate = remedy_success_rate(&store, "Belladonna", None).unwrap();
        assert_eq!(rate.decided, 3);
        assert_eq!(rate.improved, 2);
        assert!((rate.rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
