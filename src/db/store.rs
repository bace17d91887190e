//! Collaborator contracts between the pipeline and its storage layer.
//!
//! The engine only ever sees these two traits; `SqliteStore` is the
//! bundled implementation over the repository functions. "Not found" is
//! an `Ok(None)` / typed `NotFound`, always distinguishable from a
//! transport or storage failure.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{repository, sqlite, DatabaseError};
use crate::engine::types::{CaseRecord, RemedyDecision, SuccessRate, SymptomRemedyCorrelation};
use crate::models::enums::{OutcomeStatus, SymptomCategory};
use crate::models::{Remedy, Rubric, RubricGrade, Symptom};

/// Reference-data lookups consumed by pipeline stages 1–4. All reads;
/// reference data is immutable from the pipeline's perspective.
pub trait ReferenceStore {
    fn symptom_by_code(&self, code: &str) -> Result<Option<Symptom>, DatabaseError>;

    /// Case-insensitive name/synonym lookup scoped to one category.
    fn symptom_by_name(
        &self,
        name: &str,
        category: SymptomCategory,
    ) -> Result<Option<Symptom>, DatabaseError>;

    /// Rubrics whose explicit symptom-link set intersects `codes`.
    fn rubrics_linking_any(&self, codes: &[String]) -> Result<Vec<Rubric>, DatabaseError>;

    /// Substring search over rubric text, scoped to one reference source.
    fn rubrics_matching_text(
        &self,
        repertory: &str,
        pattern: &str,
    ) -> Result<Vec<Rubric>, DatabaseError>;

    fn remedies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Remedy>, DatabaseError>;

    fn grades_for_rubrics(&self, rubric_ids: &[Uuid])
        -> Result<Vec<RubricGrade>, DatabaseError>;
}

/// Case-record persistence: one insert per pipeline run, plus the
/// follow-up operations on existing records.
pub trait CaseStore {
    fn insert_case(&self, record: &CaseRecord) -> Result<(), DatabaseError>;

    fn case_by_id(&self, id: Uuid) -> Result<Option<CaseRecord>, DatabaseError>;

    fn attach_decision(
        &self,
        id: Uuid,
        decision: &RemedyDecision,
        updated_at: NaiveDateTime,
    ) -> Result<(), DatabaseError>;

    fn update_outcome(
        &self,
        id: Uuid,
        outcome: OutcomeStatus,
        notes: Option<&str>,
        updated_at: NaiveDateTime,
    ) -> Result<(), DatabaseError>;

    fn remedy_success_rate(
        &self,
        remedy_name: &str,
        range: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<SuccessRate, DatabaseError>;

    fn symptom_remedy_correlations(
        &self,
        symptom_code: &str,
    ) -> Result<Vec<SymptomRemedyCorrelation>, DatabaseError>;
}

/// SQLite-backed implementation of both store contracts.
pub struct SqliteStore {
    pub conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: sqlite::open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: sqlite::open_memory_database()?,
        })
    }
}

impl ReferenceStore for SqliteStore {
    fn symptom_by_code(&self, code: &str) -> Result<Option<Symptom>, DatabaseError> {
        repository::get_symptom_by_code(&self.conn, code)
    }

    fn symptom_by_name(
        &self,
        name: &str,
        category: SymptomCategory,
    ) -> Result<Option<Symptom>, DatabaseError> {
        repository::find_symptom_by_name(&self.conn, name, category)
    }

    fn rubrics_linking_any(&self, codes: &[String]) -> Result<Vec<Rubric>, DatabaseError> {
        repository::get_rubrics_linking_any(&self.conn, codes)
    }

    fn rubrics_matching_text(
        &self,
        repertory: &str,
        pattern: &str,
    ) -> Result<Vec<Rubric>, DatabaseError> {
        repository::find_rubrics_by_text(&self.conn, repertory, pattern)
    }

    fn remedies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Remedy>, DatabaseError> {
        repository::get_remedies_by_ids(&self.conn, ids)
    }

    fn grades_for_rubrics(
        &self,
        rubric_ids: &[Uuid],
    ) -> Result<Vec<RubricGrade>, DatabaseError> {
        repository::get_grades_for_rubrics(&self.conn, rubric_ids)
    }
}

impl CaseStore for SqliteStore {
    fn insert_case(&self, record: &CaseRecord) -> Result<(), DatabaseError> {
        repository::insert_case_record(&self.conn, record)
    }

    fn case_by_id(&self, id: Uuid) -> Result<Option<CaseRecord>, DatabaseError> {
        repository::get_case_record(&self.conn, id)
    }

    fn attach_decision(
        &self,
        id: Uuid,
        decision: &RemedyDecision,
        updated_at: NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        repository::attach_decision(&self.conn, id, decision, updated_at)
    }

    fn update_outcome(
        &self,
        id: Uuid,
        outcome: OutcomeStatus,
        notes: Option<&str>,
        updated_at: NaiveDateTime,
    ) -> Result<(), DatabaseError> {
        repository::update_outcome(&self.conn, id, outcome, notes, updated_at)
    }

    fn remedy_success_rate(
        &self,
        remedy_name: &str,
        range: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<SuccessRate, DatabaseError> {
        repository::remedy_success_rate(&self.conn, remedy_name, range)
    }

    fn symptom_remedy_correlations(
        &self,
        symptom_code: &str,
    ) -> Result<Vec<SymptomRemedyCorrelation>, DatabaseError> {
        repository::symptom_remedy_correlations(&self.conn, symptom_code)
    }
}
