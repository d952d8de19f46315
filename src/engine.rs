//! Engine front door.
//!
//! Wires the repository seams to the pure computation functions. The
//! engine owns no state beyond its store references and recomputes
//! everything from the full answer set on every call.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{self, legacy::LegacyModel};
use crate::error::EngineError;
use crate::models::{
    AnswerRecord, AssessmentSession, DataSource, ParetoAnalysis, ProcessRollup, ProjectedRecord,
    SessionStats, SourceKind,
};
use crate::pareto;
use crate::projector;
use crate::rollup;
use crate::stats;
use crate::store::{LegacyCatalogStore, ResultStore, SessionStore, TemplateStore};

/// Everything the engine can say about one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Session metadata.
    pub session: AssessmentSession,
    /// Resolved catalog view.
    pub data_source: DataSource,
    /// Records in display order with process ratings.
    pub results: Vec<ProjectedRecord>,
    /// Aggregated statistics.
    pub stats: SessionStats,
    /// Pareto gap rankings.
    pub pareto: ParetoAnalysis,
    /// Four-dimension maturity rollup.
    pub rollup: Vec<ProcessRollup>,
    /// Applicable records scoring below 3, in display order.
    pub weak_spots: Vec<AnswerRecord>,
}

/// Computation context over the four store seams.
///
/// Callers own the stores and pass them in; the engine borrows them for
/// the duration of a request and keeps no other state.
pub struct Engine<'a> {
    sessions: &'a dyn SessionStore,
    results: &'a dyn ResultStore,
    legacy: &'a dyn LegacyCatalogStore,
    templates: &'a dyn TemplateStore,
}

impl<'a> Engine<'a> {
    /// Creates an engine over the given stores.
    pub fn new(
        sessions: &'a dyn SessionStore,
        results: &'a dyn ResultStore,
        legacy: &'a dyn LegacyCatalogStore,
        templates: &'a dyn TemplateStore,
    ) -> Self {
        Self {
            sessions,
            results,
            legacy,
            templates,
        }
    }

    /// Creates an engine over one store implementing every seam.
    pub fn from_store<S>(store: &'a S) -> Self
    where
        S: SessionStore + ResultStore + LegacyCatalogStore + TemplateStore,
    {
        Self::new(store, store, store, store)
    }

    /// Loads a session or reports it missing.
    pub fn load_session(&self, id: Uuid) -> Result<AssessmentSession, EngineError> {
        self.sessions
            .fetch_session(id)?
            .ok_or(EngineError::SessionNotFound(id))
    }

    /// Lists known sessions, newest first.
    pub fn list_sessions(&self) -> Result<Vec<AssessmentSession>, EngineError> {
        self.sessions.list_sessions()
    }

    /// Fetches the raw answer records of a session.
    pub fn fetch_results(&self, session_id: Uuid) -> Result<Vec<AnswerRecord>, EngineError> {
        self.results.fetch_results(session_id)
    }

    /// Resolves the catalog a session is bound to.
    pub fn resolve_data_source(
        &self,
        session: &AssessmentSession,
    ) -> Result<DataSource, EngineError> {
        Ok(catalog::resolve_data_source(
            session,
            self.legacy,
            self.templates,
        )?)
    }

    /// Projects a session's records into display order.
    pub fn project_results(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<ProjectedRecord>, EngineError> {
        let session = self.load_session(session_id)?;
        let source = self.resolve_data_source(&session)?;
        let records = self.fetch_results(session_id)?;
        let legacy_model = self.legacy_model_for(&source)?;
        Ok(projector::project_results(
            records,
            &source,
            legacy_model.as_ref(),
        ))
    }

    /// Computes the aggregated statistics of a session.
    pub fn compute_session_stats(&self, session_id: Uuid) -> Result<SessionStats, EngineError> {
        let session = self.load_session(session_id)?;
        let source = self.resolve_data_source(&session)?;
        let records = self.fetch_results(session_id)?;
        Ok(stats::compute_session_stats(&records, &source))
    }

    /// Computes the Pareto gap ranking of a session.
    pub fn compute_pareto(&self, session_id: Uuid) -> Result<ParetoAnalysis, EngineError> {
        let session = self.load_session(session_id)?;
        let source = self.resolve_data_source(&session)?;
        let records = self.fetch_results(session_id)?;
        Ok(pareto::compute_pareto(&records, &source))
    }

    /// Computes the four-dimension maturity rollup of a session.
    pub fn compute_four_dimension_rollup(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<ProcessRollup>, EngineError> {
        self.load_session(session_id)?;
        let records = self.fetch_results(session_id)?;
        Ok(rollup::compute_four_dimension_rollup(&records))
    }

    /// Runs every computation for one session in a single pass.
    pub fn assess(&self, session_id: Uuid) -> Result<Assessment, EngineError> {
        let session = self.load_session(session_id)?;
        info!("Assessing session {} ({})", session_id, session.company);

        let source = self.resolve_data_source(&session)?;
        let records = self.fetch_results(session_id)?;
        let legacy_model = self.legacy_model_for(&source)?;

        let results =
            projector::project_results(records.clone(), &source, legacy_model.as_ref());
        let stats = stats::compute_session_stats(&records, &source);
        let pareto = pareto::compute_pareto(&records, &source);
        let rollup = rollup::compute_four_dimension_rollup(&records);
        let ordered: Vec<AnswerRecord> = results.iter().map(|p| p.record.clone()).collect();
        let weak_spots = stats::weak_spots(&ordered);

        Ok(Assessment {
            session,
            data_source: source,
            results,
            stats,
            pareto,
            rollup,
            weak_spots,
        })
    }

    fn legacy_model_for(&self, source: &DataSource) -> Result<Option<LegacyModel>, EngineError> {
        match &source.kind {
            SourceKind::Legacy { model } => Ok(self.legacy.fetch_model(model)?),
            SourceKind::Versioned { .. } => Ok(None),
        }
    }
}
