//! Four-dimension maturity rollup.
//!
//! Free-text category labels map onto the four canonical dimensions
//! through an ordered synonym table. Per process, each dimension's value
//! is the mean of its activities' mean applicable scores, so a thin
//! activity cannot drown out a well-covered one.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{round2, AnswerRecord, Dimension, DimensionScores, ProcessRollup};

/// Ordered synonym table. Priority matters: "Process Control" must
/// classify as governance, not monitoring, so the list is scanned in
/// order and the first hit wins.
const SYNONYMS: [(&str, Dimension); 11] = [
    ("governance", Dimension::Governance),
    ("process", Dimension::Governance),
    ("monitoring", Dimension::MonitoringControl),
    ("monitoring & control", Dimension::MonitoringControl),
    ("control", Dimension::MonitoringControl),
    ("technology", Dimension::Technology),
    ("tech", Dimension::Technology),
    ("ict", Dimension::Technology),
    ("organization", Dimension::Organization),
    ("org", Dimension::Organization),
    ("people", Dimension::Organization),
];

/// Maps a free-text category label onto a canonical dimension.
///
/// Case-insensitive substring containment; labels matching no synonym
/// return `None` and drop out of the rollup.
pub fn classify_category(category: &str) -> Option<Dimension> {
    let lowered = category.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(synonym, _)| lowered.contains(*synonym))
        .map(|(_, dimension)| *dimension)
}

/// Rolls answer records up into per-process dimension scores, sorted by
/// overall score descending.
///
/// Every process with at least one record appears, even when nothing
/// classifies; its dimensions stay at 0.0.
pub fn compute_four_dimension_rollup(records: &[AnswerRecord]) -> Vec<ProcessRollup> {
    // First-seen process order keeps ties in the final sort stable.
    let mut process_order: Vec<String> = Vec::new();
    let mut cells: BTreeMap<String, BTreeMap<Dimension, BTreeMap<String, (u32, usize)>>> =
        BTreeMap::new();

    for record in records {
        if !process_order.contains(&record.process) {
            process_order.push(record.process.clone());
        }
        if !record.is_applicable() {
            continue;
        }
        let dimension = match classify_category(&record.category) {
            Some(d) => d,
            None => continue,
        };
        let cell = cells
            .entry(record.process.clone())
            .or_default()
            .entry(dimension)
            .or_default()
            .entry(record.activity.clone())
            .or_insert((0, 0));
        cell.0 += u32::from(record.score);
        cell.1 += 1;
    }

    let mut rollups: Vec<ProcessRollup> = process_order
        .into_iter()
        .map(|process| {
            let mut dimensions = DimensionScores::default();
            if let Some(by_dimension) = cells.get(&process) {
                for dimension in Dimension::ALL {
                    if let Some(activities) = by_dimension.get(&dimension) {
                        let means: Vec<f64> = activities
                            .values()
                            .map(|(sum, count)| f64::from(*sum) / *count as f64)
                            .collect();
                        if !means.is_empty() {
                            let value = means.iter().sum::<f64>() / means.len() as f64;
                            dimensions.set(dimension, round2(value));
                        }
                    }
                }
            }

            let valid: Vec<f64> = Dimension::ALL
                .iter()
                .map(|d| dimensions.get(*d))
                .filter(|v| *v > 0.0)
                .collect();
            let overall_score = if valid.is_empty() {
                0.0
            } else {
                round2(valid.iter().sum::<f64>() / valid.len() as f64)
            };

            ProcessRollup {
                process,
                dimensions,
                overall_score,
            }
        })
        .collect();

    rollups.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
    });
    debug!("Rolled up {} process(es) into four dimensions", rollups.len());
    rollups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(process: &str, activity: &str, category: &str, score: u8) -> AnswerRecord {
        AnswerRecord {
            process: process.to_string(),
            activity: activity.to_string(),
            category: category.to_string(),
            dimension: format!("{} {} q", activity, category),
            score,
            note: None,
            is_not_applicable: false,
        }
    }

    fn make_na_record(process: &str, activity: &str, category: &str) -> AnswerRecord {
        AnswerRecord {
            is_not_applicable: true,
            ..make_record(process, activity, category, 0)
        }
    }

    #[test]
    fn test_classify_known_labels() {
        assert_eq!(classify_category("Governance"), Some(Dimension::Governance));
        assert_eq!(
            classify_category("Monitoring & Control"),
            Some(Dimension::MonitoringControl)
        );
        assert_eq!(
            classify_category("ICT Infrastructure"),
            Some(Dimension::Technology)
        );
        assert_eq!(
            classify_category("People & Culture"),
            Some(Dimension::Organization)
        );
        assert_eq!(classify_category("Quality"), None);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify_category("GOVERNANCE"), Some(Dimension::Governance));
        assert_eq!(classify_category("tech stack"), Some(Dimension::Technology));
    }

    #[test]
    fn test_classify_first_match_wins() {
        // "process" sits before "control" in the table.
        assert_eq!(
            classify_category("Process Control"),
            Some(Dimension::Governance)
        );
        // "governance" sits before "technology".
        assert_eq!(
            classify_category("Technology Governance"),
            Some(Dimension::Governance)
        );
    }

    #[test]
    fn test_rollup_averages_activity_means() {
        // A1 holds scores 2 and 4 (mean 3); A2 holds only a
        // not-applicable record and must not drag the mean down.
        let records = vec![
            make_record("P", "A1", "Governance", 2),
            make_record("P", "A1", "Governance", 4),
            make_na_record("P", "A2", "Governance"),
        ];
        let rollups = compute_four_dimension_rollup(&records);

        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].dimensions.governance, 3.0);
        assert_eq!(rollups[0].overall_score, 3.0);
    }

    #[test]
    fn test_rollup_merges_labels_sharing_a_dimension() {
        // "Governance" and "Process Quality" both classify as
        // governance; their activities average together.
        let records = vec![
            make_record("P", "A1", "Governance", 2),
            make_record("P", "A2", "Process Quality", 4),
        ];
        let rollups = compute_four_dimension_rollup(&records);
        assert_eq!(rollups[0].dimensions.governance, 3.0);
    }

    #[test]
    fn test_overall_ignores_zero_dimensions() {
        let records = vec![
            make_record("P", "A1", "Governance", 3),
            make_record("P", "A2", "Technology", 4),
        ];
        let rollups = compute_four_dimension_rollup(&records);

        assert_eq!(rollups[0].dimensions.governance, 3.0);
        assert_eq!(rollups[0].dimensions.technology, 4.0);
        assert_eq!(rollups[0].dimensions.organization, 0.0);
        // Mean of the two nonzero dimensions only.
        assert_eq!(rollups[0].overall_score, 3.5);
    }

    #[test]
    fn test_rollup_sorted_by_overall_descending() {
        let records = vec![
            make_record("Weak", "A1", "Governance", 1),
            make_record("Strong", "A1", "Governance", 5),
        ];
        let rollups = compute_four_dimension_rollup(&records);
        assert_eq!(rollups[0].process, "Strong");
        assert_eq!(rollups[1].process, "Weak");
    }

    #[test]
    fn test_rollup_ties_keep_first_seen_order() {
        let records = vec![
            make_record("Second", "A1", "Governance", 3),
            make_record("First", "A1", "Governance", 3),
        ];
        let rollups = compute_four_dimension_rollup(&records);
        assert_eq!(rollups[0].process, "Second");
        assert_eq!(rollups[1].process, "First");
    }

    #[test]
    fn test_unmapped_process_still_listed() {
        let records = vec![make_record("P", "A1", "Quality", 4)];
        let rollups = compute_four_dimension_rollup(&records);

        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].dimensions, DimensionScores::default());
        assert_eq!(rollups[0].overall_score, 0.0);
    }

    #[test]
    fn test_empty_records_empty_rollup() {
        assert!(compute_four_dimension_rollup(&[]).is_empty());
    }
}
