//! Legacy flat-file catalog model.
//!
//! The legacy representation is a JSON array of process blocks, each
//! holding activities whose categories map question text to a maximum
//! score. Ordering semantics are derived directly from this structure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{AnswerRecord, CatalogEntry};

/// Domain order every legacy catalog reports, regardless of file content.
pub const LEGACY_DOMAINS: [&str; 4] = [
    "Governance",
    "Monitoring & Control",
    "Technology",
    "Organization",
];

/// One activity block of a legacy catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyActivity {
    /// Activity name.
    pub name: String,
    /// Category label to question text to maximum score.
    #[serde(default)]
    pub categories: BTreeMap<String, BTreeMap<String, u8>>,
}

/// One process block with its activities in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyProcess {
    /// Process name.
    pub process: String,
    /// Activities in declaration order.
    #[serde(default)]
    pub activities: Vec<LegacyActivity>,
}

/// A complete legacy flat-file catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyModel(pub Vec<LegacyProcess>);

impl LegacyModel {
    /// Distinct non-empty process names in declaration order.
    pub fn processes(&self) -> Vec<String> {
        let mut processes: Vec<String> = Vec::new();
        for block in &self.0 {
            if !block.process.is_empty() && !processes.contains(&block.process) {
                processes.push(block.process.clone());
            }
        }
        processes
    }

    /// Flattens the file into catalog entries with a running order rank.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        for block in &self.0 {
            for activity in &block.activities {
                for (category, dimensions) in &activity.categories {
                    for (dimension, max_score) in dimensions {
                        entries.push(CatalogEntry {
                            process: block.process.clone(),
                            activity: activity.name.clone(),
                            category: category.clone(),
                            dimension: dimension.clone(),
                            order: entries.len(),
                            max_score: *max_score,
                        });
                    }
                }
            }
        }
        entries
    }

    /// One zero-scored, applicable record per question: the shape a freshly
    /// initialized session starts from.
    pub fn seed_records(&self) -> Vec<AnswerRecord> {
        self.entries()
            .into_iter()
            .map(|entry| AnswerRecord {
                process: entry.process,
                activity: entry.activity,
                category: entry.category,
                dimension: entry.dimension,
                score: 0,
                note: None,
                is_not_applicable: false,
            })
            .collect()
    }

    /// Builds the ordering index used to sort answer records.
    pub fn order_index(&self) -> LegacyOrderIndex {
        let mut index = LegacyOrderIndex::default();
        for block in &self.0 {
            if !index.processes.contains(&block.process) {
                index.processes.push(block.process.clone());
            }
            for activity in &block.activities {
                for category in activity.categories.keys() {
                    let activities = index
                        .activities
                        .entry(block.process.clone())
                        .or_default()
                        .entry(category.clone())
                        .or_default();
                    if !activities.contains(&activity.name) {
                        activities.push(activity.name.clone());
                    }
                }
            }
        }
        index
    }

    /// Whether the file declares no processes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ordering facts extracted from a legacy file: process declaration order
/// and activity first-appearance order per (process, category) pair.
#[derive(Debug, Clone, Default)]
pub struct LegacyOrderIndex {
    processes: Vec<String>,
    activities: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl LegacyOrderIndex {
    /// Whether the index holds no ordering information.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Rank of a process by declaration order.
    pub fn process_rank(&self, process: &str) -> Option<usize> {
        self.processes.iter().position(|p| p == process)
    }

    /// Rank of a category within the fixed legacy domain order.
    /// Exact match only; unknown labels get no rank.
    pub fn domain_rank(category: &str) -> Option<usize> {
        LEGACY_DOMAINS.iter().position(|d| *d == category)
    }

    /// Rank of an activity by first appearance within its
    /// (process, category) pair.
    pub fn activity_rank(&self, process: &str, category: &str, activity: &str) -> Option<usize> {
        self.activities
            .get(process)
            .and_then(|categories| categories.get(category))
            .and_then(|activities| activities.iter().position(|a| a == activity))
    }
}
