//! Pareto gap ranking.
//!
//! Turns per-cell score means into normalized gaps, ranks processes and
//! domains by their share of the system-wide gap, and flags the entries
//! inside the 80% cumulative cutoff. The two axes are exact duals of
//! each other.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{round2, round4, AnswerRecord, DataSource, ParetoAnalysis, ParetoEntry};

/// Ranks processes and domains by normalized gap share.
///
/// Per primary-axis entry, each secondary-axis cell with applicable
/// records contributes `(5 - mean) / primary_count` to its total gap.
/// Percentages are shares of the summed totals; the ranking accumulates
/// the rounded percentages while the critical check compares the raw
/// running sum against 80, inclusive.
pub fn compute_pareto(records: &[AnswerRecord], source: &DataSource) -> ParetoAnalysis {
    let (by_process, system_total) =
        rank_axis(records, &source.processes, &source.domains, process_key);
    let (by_domain, _) = rank_axis(records, &source.domains, &source.processes, domain_key);

    let critical_processes = critical_names(&by_process);
    let critical_domains = critical_names(&by_domain);
    debug!(
        "Pareto ranking: {} critical process(es), {} critical domain(s), system gap {:.4}",
        critical_processes.len(),
        critical_domains.len(),
        system_total
    );

    ParetoAnalysis {
        by_process,
        by_domain,
        total_gap_system: round4(system_total),
        critical_processes,
        critical_domains,
    }
}

fn process_key(record: &AnswerRecord) -> (&str, &str) {
    (&record.process, &record.category)
}

fn domain_key(record: &AnswerRecord) -> (&str, &str) {
    (&record.category, &record.process)
}

/// Ranks one axis. `key` extracts (primary, secondary) from a record;
/// records outside the catalog lists are ignored.
fn rank_axis(
    records: &[AnswerRecord],
    primary: &[String],
    secondary: &[String],
    key: fn(&AnswerRecord) -> (&str, &str),
) -> (Vec<ParetoEntry>, f64) {
    let mut cells: BTreeMap<(&str, &str), (u32, usize)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_applicable()) {
        let cell = cells.entry(key(record)).or_insert((0, 0));
        cell.0 += u32::from(record.score);
        cell.1 += 1;
    }

    let divisor = primary.len() as f64;
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut system_total = 0.0;
    for name in primary {
        let mut total_gap = 0.0;
        for other in secondary {
            if let Some((score_sum, count)) = cells.get(&(name.as_str(), other.as_str())) {
                if *count > 0 {
                    let mean = f64::from(*score_sum) / *count as f64;
                    total_gap += (5.0 - mean) / divisor;
                }
            }
        }
        system_total += total_gap;
        totals.push((name.clone(), total_gap));
    }

    let mut entries: Vec<ParetoEntry> = totals
        .into_iter()
        .map(|(name, gap)| {
            let percentage = if system_total > 0.0 {
                gap / system_total * 100.0
            } else {
                0.0
            };
            ParetoEntry {
                name,
                total_gap: round4(gap),
                gap_percentage: round2(percentage),
                cumulative_percentage: 0.0,
                is_critical: false,
            }
        })
        .collect();

    // Stable sort: ties keep catalog order.
    entries.sort_by(|a, b| {
        b.gap_percentage
            .partial_cmp(&a.gap_percentage)
            .unwrap_or(Ordering::Equal)
    });

    let mut cumulative = 0.0;
    for entry in &mut entries {
        cumulative += entry.gap_percentage;
        entry.cumulative_percentage = round2(cumulative);
        entry.is_critical = cumulative <= 80.0;
    }

    (entries, system_total)
}

fn critical_names(entries: &[ParetoEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.is_critical)
        .map(|e| e.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn make_record(process: &str, category: &str, score: u8, na: bool) -> AnswerRecord {
        AnswerRecord {
            process: process.to_string(),
            activity: "A1".to_string(),
            category: category.to_string(),
            dimension: format!("{} {} question", process, category),
            score,
            note: None,
            is_not_applicable: na,
        }
    }

    fn make_source(processes: &[&str], domains: &[&str]) -> DataSource {
        DataSource {
            kind: SourceKind::Legacy {
                model: "demo".to_string(),
            },
            processes: processes.iter().map(|p| p.to_string()).collect(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            catalog_entries: Vec::new(),
        }
    }

    #[test]
    fn test_three_uniform_processes() {
        // Three processes, four domains, every cell mean exactly 3.0.
        let processes = ["P1", "P2", "P3"];
        let domains = ["D1", "D2", "D3", "D4"];
        let mut records = Vec::new();
        for p in &processes {
            for d in &domains {
                records.push(make_record(p, d, 3, false));
            }
        }
        let source = make_source(&processes, &domains);
        let pareto = compute_pareto(&records, &source);

        let names: Vec<&str> = pareto.by_process.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2", "P3"]);
        for entry in &pareto.by_process {
            assert_eq!(entry.gap_percentage, 33.33);
        }
        let cumulative: Vec<f64> = pareto
            .by_process
            .iter()
            .map(|e| e.cumulative_percentage)
            .collect();
        assert_eq!(cumulative, vec![33.33, 66.66, 99.99]);
        let critical: Vec<bool> = pareto.by_process.iter().map(|e| e.is_critical).collect();
        assert_eq!(critical, vec![true, true, false]);
        assert_eq!(pareto.critical_processes, vec!["P1", "P2"]);

        // Each process: four domains contributing (5-3)/3 each.
        assert_eq!(pareto.by_process[0].total_gap, 2.6667);
        assert_eq!(pareto.total_gap_system, 8.0);
    }

    #[test]
    fn test_percentages_sum_to_about_100() {
        let records = vec![
            make_record("P1", "D1", 1, false),
            make_record("P1", "D2", 2, false),
            make_record("P2", "D1", 4, false),
            make_record("P3", "D2", 3, false),
        ];
        let source = make_source(&["P1", "P2", "P3"], &["D1", "D2"]);
        let pareto = compute_pareto(&records, &source);

        let sum: f64 = pareto.by_process.iter().map(|e| e.gap_percentage).sum();
        assert!((sum - 100.0).abs() < 0.05, "sum was {}", sum);
    }

    #[test]
    fn test_critical_flags_form_a_prefix() {
        let records = vec![
            make_record("P1", "D1", 0, false),
            make_record("P2", "D1", 2, false),
            make_record("P3", "D1", 3, false),
            make_record("P4", "D1", 4, false),
            make_record("P5", "D1", 5, false),
        ];
        let source = make_source(&["P1", "P2", "P3", "P4", "P5"], &["D1"]);
        let pareto = compute_pareto(&records, &source);

        let flags: Vec<bool> = pareto.by_process.iter().map(|e| e.is_critical).collect();
        let first_false = flags.iter().position(|f| !*f).unwrap_or(flags.len());
        assert!(
            flags[first_false..].iter().all(|f| !*f),
            "critical flags must never interleave: {:?}",
            flags
        );
    }

    #[test]
    fn test_no_records_degenerates_to_zero() {
        let source = make_source(&["P1", "P2"], &["D1"]);
        let pareto = compute_pareto(&[], &source);

        assert_eq!(pareto.by_process.len(), 2);
        assert_eq!(pareto.total_gap_system, 0.0);
        for entry in &pareto.by_process {
            assert_eq!(entry.total_gap, 0.0);
            assert_eq!(entry.gap_percentage, 0.0);
            assert_eq!(entry.cumulative_percentage, 0.0);
            // A zero running sum never crosses the cutoff.
            assert!(entry.is_critical);
        }
    }

    #[test]
    fn test_single_gap_holder_is_not_critical() {
        // One process carries 100% of the gap, so its own cumulative
        // share already exceeds the cutoff.
        let records = vec![
            make_record("P1", "D1", 1, false),
            make_record("P2", "D1", 5, false),
        ];
        let source = make_source(&["P1", "P2"], &["D1"]);
        let pareto = compute_pareto(&records, &source);

        assert_eq!(pareto.by_process[0].name, "P1");
        assert_eq!(pareto.by_process[0].gap_percentage, 100.0);
        assert!(!pareto.by_process[0].is_critical);
        assert!(pareto.critical_processes.is_empty());
    }

    #[test]
    fn test_na_and_unknown_records_do_not_contribute() {
        let records = vec![
            make_record("P1", "D1", 1, false),
            make_record("P1", "D1", 0, true),
            make_record("Stray", "D1", 0, false),
        ];
        let source = make_source(&["P1", "P2"], &["D1"]);
        let pareto = compute_pareto(&records, &source);

        // Only the single applicable P1 record counts: gap (5-1)/2.
        assert_eq!(pareto.by_process[0].name, "P1");
        assert_eq!(pareto.by_process[0].total_gap, 2.0);
        assert_eq!(pareto.total_gap_system, 2.0);
        assert!(!pareto.by_process.iter().any(|e| e.name == "Stray"));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let records = vec![
            make_record("Zeta", "D1", 2, false),
            make_record("Alpha", "D1", 2, false),
        ];
        // Zeta is declared first, so it stays first on a tie.
        let source = make_source(&["Zeta", "Alpha"], &["D1"]);
        let pareto = compute_pareto(&records, &source);

        assert_eq!(pareto.by_process[0].name, "Zeta");
        assert_eq!(pareto.by_process[1].name, "Alpha");
        assert_eq!(
            pareto.by_process[0].gap_percentage,
            pareto.by_process[1].gap_percentage
        );
    }

    #[test]
    fn test_domain_axis_normalizes_by_domain_count() {
        let records = vec![make_record("P1", "D1", 3, false)];
        let source = make_source(&["P1", "P2"], &["D1"]);
        let pareto = compute_pareto(&records, &source);

        // Process axis divides the 2.0 gap by two processes.
        assert_eq!(pareto.by_process[0].total_gap, 1.0);
        // Domain axis divides the same gap by one domain.
        assert_eq!(pareto.by_domain[0].total_gap, 2.0);
    }
}
