//! Session statistics aggregation.
//!
//! Accumulates answer records into completion figures, per-process and
//! per-domain score groups, the process-by-domain matrix, and the score
//! distribution. Everything recomputes from the full record set; the
//! functions here are pure.

use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{round2, AnswerRecord, DataSource, GroupStats, ScoreMatrix, SessionStats};

/// Aggregates a session's answer records against its resolved catalog.
pub fn compute_session_stats(records: &[AnswerRecord], source: &DataSource) -> SessionStats {
    let total_questions = records.len();
    let answered_questions = records.iter().filter(|r| r.is_applicable()).count();
    let na_questions = total_questions - answered_questions;
    let completion_percentage = if total_questions > 0 {
        round2(answered_questions as f64 / total_questions as f64 * 100.0)
    } else {
        0.0
    };

    let mut by_process: BTreeMap<String, GroupStats> = BTreeMap::new();
    let mut by_domain: BTreeMap<String, GroupStats> = BTreeMap::new();
    let mut overall_total: u32 = 0;
    let mut overall_count: usize = 0;
    let mut score_distribution = [0usize; 6];

    for record in records {
        update_group(by_process.entry(record.process.clone()).or_default(), record);
        update_group(by_domain.entry(record.category.clone()).or_default(), record);

        if record.is_applicable() {
            overall_total += u32::from(record.score);
            overall_count += 1;
            let slot = usize::from(record.score);
            if slot < score_distribution.len() {
                score_distribution[slot] += 1;
            }
        }
    }

    for stats in by_process.values_mut().chain(by_domain.values_mut()) {
        stats.average_score = if stats.max_score > 0 {
            round2(f64::from(stats.total_score) / f64::from(stats.max_score) * 100.0)
        } else {
            0.0
        };
    }

    let overall_score = if overall_count > 0 {
        round2(f64::from(overall_total) / (5.0 * overall_count as f64) * 100.0)
    } else {
        0.0
    };

    debug!(
        "Aggregated {} record(s) into {} process group(s) and {} domain group(s)",
        total_questions,
        by_process.len(),
        by_domain.len()
    );

    SessionStats {
        total_questions,
        answered_questions,
        na_questions,
        completion_percentage,
        overall_score,
        by_process,
        by_domain,
        matrix: compute_matrix(records, source),
        score_distribution,
        processes: source.processes.clone(),
        domains: source.domains.clone(),
    }
}

/// Builds the process-by-domain average matrix in both orientations.
///
/// Every pair from the catalog's process and domain lists gets a cell,
/// 0.0 when no applicable record matches it. The two orientations read
/// the same accumulator, so they are transposes by construction.
pub fn compute_matrix(records: &[AnswerRecord], source: &DataSource) -> ScoreMatrix {
    let mut cells: BTreeMap<(&str, &str), (u32, u32)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_applicable()) {
        let cell = cells
            .entry((record.process.as_str(), record.category.as_str()))
            .or_insert((0, 0));
        cell.0 += u32::from(record.score);
        cell.1 += 5;
    }

    let mut matrix = ScoreMatrix::default();
    for process in &source.processes {
        let mut row = BTreeMap::new();
        for domain in &source.domains {
            row.insert(domain.clone(), cell_average(&cells, process, domain));
        }
        matrix.by_process.insert(process.clone(), row);
    }
    for domain in &source.domains {
        let mut row = BTreeMap::new();
        for process in &source.processes {
            row.insert(process.clone(), cell_average(&cells, process, domain));
        }
        matrix.by_domain.insert(domain.clone(), row);
    }
    matrix
}

/// Applicable records scoring below 3, in their given order.
pub fn weak_spots(records: &[AnswerRecord]) -> Vec<AnswerRecord> {
    records
        .iter()
        .filter(|r| r.is_applicable() && r.score < 3)
        .cloned()
        .collect()
}

fn update_group(stats: &mut GroupStats, record: &AnswerRecord) {
    if record.is_applicable() {
        stats.total_score += u32::from(record.score);
        stats.max_score += 5;
        stats.count += 1;
        stats.lowest_score = Some(match stats.lowest_score {
            Some(lowest) => lowest.min(record.score),
            None => record.score,
        });
        stats.highest_score = Some(match stats.highest_score {
            Some(highest) => highest.max(record.score),
            None => record.score,
        });
    } else {
        stats.na_count += 1;
    }
}

fn cell_average(cells: &BTreeMap<(&str, &str), (u32, u32)>, process: &str, domain: &str) -> f64 {
    match cells.get(&(process, domain)) {
        Some((total, max)) if *max > 0 => round2(f64::from(*total) / f64::from(*max) * 100.0),
        _ => 0.0,
    }
}
