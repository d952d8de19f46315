//! Catalog resolution.
//!
//! A session points at either a versioned template or a legacy flat
//! file. Resolution turns that pointer into a `DataSource` carrying the
//! canonical process and domain lists; downstream statistics never
//! branch on the representation again.

pub mod legacy;

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::models::{AnswerRecord, AssessmentSession, DataSource, SourceKind};
use crate::store::{LegacyCatalogStore, TemplateStore};
use legacy::{LegacyModel, LEGACY_DOMAINS};

/// Resolves the catalog a session is bound to.
///
/// Versioned sessions report lexicographically sorted process and domain
/// lists; legacy sessions report processes in declaration order and the
/// fixed four-domain tuple. A missing legacy file yields an empty source
/// rather than an error.
pub fn resolve_data_source(
    session: &AssessmentSession,
    legacy_store: &dyn LegacyCatalogStore,
    template_store: &dyn TemplateStore,
) -> Result<DataSource, CatalogError> {
    if let Some(version_id) = session.template_version_id {
        debug!(
            "Resolving versioned catalog {} for session {}",
            version_id, session.id
        );
        let entries = template_store
            .fetch_entries(version_id)?
            .ok_or(CatalogError::UnknownTemplateVersion(version_id))?;

        let processes = sorted_distinct(entries.iter().map(|e| e.process.as_str()));
        let domains = sorted_distinct(entries.iter().map(|e| e.category.as_str()));
        return Ok(DataSource {
            kind: SourceKind::Versioned { version_id },
            processes,
            domains,
            catalog_entries: entries,
        });
    }

    let model_name = session.catalog_name().to_string();
    match legacy_store.fetch_model(&model_name)? {
        Some(model) => {
            let processes = model.processes();
            debug!(
                "Resolved legacy catalog '{}' with {} process(es)",
                model_name,
                processes.len()
            );
            Ok(DataSource {
                kind: SourceKind::Legacy { model: model_name },
                processes,
                domains: LEGACY_DOMAINS.iter().map(|d| d.to_string()).collect(),
                catalog_entries: Vec::new(),
            })
        }
        None => {
            warn!(
                "Legacy model '{}' not found, resolving to an empty catalog",
                model_name
            );
            Ok(DataSource::empty(SourceKind::Legacy { model: model_name }))
        }
    }
}

/// One zero-scored, applicable record per catalog question.
///
/// Versioned sources seed from their entries; legacy sources need the
/// flat-file model itself.
pub fn seed_answer_records(
    source: &DataSource,
    legacy_model: Option<&LegacyModel>,
) -> Vec<AnswerRecord> {
    match &source.kind {
        SourceKind::Versioned { .. } => source
            .catalog_entries
            .iter()
            .map(|entry| AnswerRecord {
                process: entry.process.clone(),
                activity: entry.activity.clone(),
                category: entry.category.clone(),
                dimension: entry.dimension.clone(),
                score: 0,
                note: None,
                is_not_applicable: false,
            })
            .collect(),
        SourceKind::Legacy { .. } => legacy_model.map(|m| m.seed_records()).unwrap_or_default(),
    }
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}
