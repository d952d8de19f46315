//! Result projection.
//!
//! Orders raw answer records the way the resolved catalog displays them
//! and annotates each one with its process rating. Versioned catalogs
//! order by entry rank; legacy catalogs order by process declaration,
//! fixed domain order, then activity first appearance.

use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use crate::catalog::legacy::{LegacyModel, LegacyOrderIndex};
use crate::models::{round2, AnswerRecord, DataSource, ProjectedRecord, SourceKind};

/// Projects answer records into display order with process ratings.
///
/// Unmatched records rank last; ties keep their original fetch order.
pub fn project_results(
    records: Vec<AnswerRecord>,
    source: &DataSource,
    legacy_model: Option<&LegacyModel>,
) -> Vec<ProjectedRecord> {
    let ordered = match &source.kind {
        SourceKind::Versioned { .. } => sort_versioned(records, source),
        SourceKind::Legacy { .. } => sort_legacy(records, legacy_model),
    };

    let ratings = process_ratings(&ordered);
    ordered
        .into_iter()
        .map(|record| {
            let process_rating = ratings.get(&record.process).copied().unwrap_or(0.0);
            ProjectedRecord {
                record,
                process_rating,
            }
        })
        .collect()
}

/// Mean applicable score per process, rounded to 2 decimals.
/// Processes with no applicable records rate 0.0.
pub fn process_ratings(records: &[AnswerRecord]) -> BTreeMap<String, f64> {
    let mut scores: BTreeMap<String, (u32, usize)> = BTreeMap::new();
    for record in records {
        let entry = scores.entry(record.process.clone()).or_insert((0, 0));
        if record.is_applicable() {
            entry.0 += u32::from(record.score);
            entry.1 += 1;
        }
    }

    scores
        .into_iter()
        .map(|(process, (total, count))| {
            let rating = if count > 0 {
                round2(f64::from(total) / count as f64)
            } else {
                0.0
            };
            (process, rating)
        })
        .collect()
}

fn sort_versioned(records: Vec<AnswerRecord>, source: &DataSource) -> Vec<AnswerRecord> {
    let order_map: HashMap<(&str, &str, &str, &str), usize> = source
        .catalog_entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| (entry.catalog_key(), idx))
        .collect();

    let mut keyed: Vec<(usize, AnswerRecord)> = records
        .into_iter()
        .map(|record| {
            let rank = order_map
                .get(&record.catalog_key())
                .copied()
                .unwrap_or(usize::MAX);
            (rank, record)
        })
        .collect();
    keyed.sort_by_key(|(rank, _)| *rank);
    keyed.into_iter().map(|(_, record)| record).collect()
}

fn sort_legacy(
    records: Vec<AnswerRecord>,
    legacy_model: Option<&LegacyModel>,
) -> Vec<AnswerRecord> {
    let index = match legacy_model {
        Some(model) => model.order_index(),
        None => return records,
    };
    // An empty structure carries no ordering facts; keep fetch order.
    if index.is_empty() {
        return records;
    }

    let mut keyed: Vec<((usize, usize, usize), AnswerRecord)> = records
        .into_iter()
        .map(|record| {
            let process_rank = index.process_rank(&record.process);
            let domain_rank = LegacyOrderIndex::domain_rank(&record.category);
            let activity_rank =
                index.activity_rank(&record.process, &record.category, &record.activity);
            if process_rank.is_none() || domain_rank.is_none() || activity_rank.is_none() {
                warn!(
                    "No legacy catalog order for record '{}/{}/{}', ranking it last",
                    record.process, record.category, record.activity
                );
            }
            let key = (
                process_rank.unwrap_or(usize::MAX),
                domain_rank.unwrap_or(usize::MAX),
                activity_rank.unwrap_or(usize::MAX),
            );
            (key, record)
        })
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, record)| record).collect()
}
