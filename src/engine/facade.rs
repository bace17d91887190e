//! Rule-engine facade: runs the eight stages in sequence for one case.
//!
//! Short-circuits with a diagnostic error when rubric matching or pool
//! construction comes up empty. All-or-nothing per case: no partial
//! results are ever surfaced.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::db::{CaseStore, ReferenceStore};
use crate::models::enums::OutcomeStatus;
use crate::models::{CaseRequest, Remedy};

use super::types::{
    CaseOutcome, CaseRecord, EngineError, RemedyDecision, SuccessRate,
    SymptomRemedyCorrelation,
};
use super::{clinical, contradiction, matching, normalize, outcome, pool, scoring, suggestion};

pub struct RuleEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: ReferenceStore + CaseStore> RuleEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline for one case and persist the record.
    pub fn run_case(&self, request: &CaseRequest) -> Result<CaseOutcome, EngineError> {
        self.run_case_at(request, Local::now().naive_local())
    }

    /// As `run_case`, with an explicit clock for the history screen and
    /// record timestamps.
    pub fn run_case_at(
        &self,
        request: &CaseRequest,
        as_of: NaiveDateTime,
    ) -> Result<CaseOutcome, EngineError> {
        let start = Instant::now();

        // [1] Normalize
        let profile = normalize::normalize_case(&self.store, &request.case, &self.config)?;

        // [2] Match rubrics and apply the selection policy
        let mappings = matching::match_rubrics(&self.store, &profile, &self.config)?;
        let (selected, selection) = matching::select_rubrics(&mappings, &self.config);
        if selected.is_empty() {
            return Err(EngineError::NoRubricsMatched {
                repertory: self.config.primary_repertory.clone(),
                symptoms: profile.all_symptoms().map(|s| s.name.clone()).collect(),
            });
        }

        // [3] Build the remedy pool from the selected rubrics' grades
        let rubric_ids: Vec<Uuid> = selected.iter().map(|m| m.rubric.id).collect();
        let grades = self.store.grades_for_rubrics(&rubric_ids)?;
        let candidate_pool = pool::build_pool(&grades);
        if candidate_pool.is_empty() {
            return Err(EngineError::EmptyRemedyPool { rubric_ids });
        }

        // Reference snapshot for the pure stages 4–7
        let remedy_ids: Vec<Uuid> = candidate_pool.keys().copied().collect();
        let remedies: HashMap<Uuid, Remedy> = self
            .store
            .remedies_by_ids(&remedy_ids)?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        // [4] Score
        let mut scores =
            scoring::score_pool(&candidate_pool, &remedies, &selected, &profile, &self.config);

        // [5] Clinical adjustments
        clinical::apply_clinical_adjustments(&mut scores, &remedies, &profile, &self.config);

        // [6] Contradiction screen
        contradiction::screen_contradictions(
            &mut scores,
            &remedies,
            &request.history,
            as_of,
            &self.config,
        );

        // [7] Assemble suggestions
        let result = suggestion::assemble_suggestions(scores, &profile, &remedies, &self.config);

        // [8] Persist the case record
        let record = CaseRecord {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            profile,
            selected_rubrics: selected,
            output: result.clone(),
            decision: None,
            outcome: OutcomeStatus::Pending,
            outcome_notes: None,
            created_at: as_of,
            updated_at: as_of,
        };
        outcome::persist_case(&self.store, &record)?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            case_id = %record.id,
            candidates = result.summary.total_remedies,
            returned = result.top.len(),
            selection = selection.as_str(),
            processing_ms = processing_time_ms,
            "Case analysis complete"
        );

        Ok(CaseOutcome {
            case_id: record.id,
            result,
            selection,
            processing_time_ms,
        })
    }

    /// Attach a doctor's final remedy decision to a persisted case.
    pub fn attach_decision(
        &self,
        case_id: Uuid,
        decision: &RemedyDecision,
    ) -> Result<(), EngineError> {
        outcome::attach_decision(&self.store, case_id, decision, Local::now().naive_local())
    }

    /// Record the follow-up outcome of a persisted case.
    pub fn record_outcome(
        &self,
        case_id: Uuid,
        status: OutcomeStatus,
        notes: Option<&str>,
    ) -> Result<(), EngineError> {
        outcome::record_outcome(
            &self.store,
            case_id,
            status,
            notes,
            Local::now().naive_local(),
        )
    }

    /// Historical success rate of one remedy, optionally time-bounded.
    pub fn remedy_success_rate(
        &self,
        remedy_name: &str,
        range: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<SuccessRate, EngineError> {
        outcome::remedy_success_rate(&self.store, remedy_name, range)
    }

    /// Symptom → remedy co-occurrence across historical cases.
    pub fn symptom_remedy_correlations(
        &self,
        symptom_code: &str,
    ) -> Result<Vec<SymptomRemedyCorrelation>, EngineError> {
        outcome::symptom_remedy_correlations(&self.store, symptom_code)
    }
}
