//! Markdown report generation.
//!
//! This module generates comprehensive Markdown assessment reports
//! from the computed statistics, gap rankings, and rollups.

use crate::engine::Assessment;
use crate::models::{
    AnswerRecord, Dimension, GroupStats, MaturityLevel, ParetoAnalysis, ParetoEntry, SessionStats,
};
use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;

/// Weak spot rows listed before the table is truncated.
const WEAK_SPOT_LIMIT: usize = 15;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(assessment: &Assessment) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Digital Maturity Assessment Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(assessment));

    // Table of contents
    output.push_str(&generate_table_of_contents());

    // Summary section
    output.push_str(&generate_summary_section(&assessment.stats));

    // Per-process and per-domain maturity tables
    output.push_str(&generate_group_section(
        "Maturity by Process",
        "Process",
        &assessment.stats.processes,
        &assessment.stats.by_process,
    ));
    output.push_str(&generate_group_section(
        "Maturity by Domain",
        "Domain",
        &assessment.stats.domains,
        &assessment.stats.by_domain,
    ));

    // Process-by-domain matrix
    output.push_str(&generate_matrix_section(&assessment.stats));

    // Pareto gap analysis
    output.push_str(&generate_pareto_section(&assessment.pareto));

    // Four-dimension rollup
    output.push_str(&generate_rollup_section(assessment));

    // Weak spots
    output.push_str(&generate_weak_spots_section(&assessment.weak_spots));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(assessment: &Assessment) -> String {
    let session = &assessment.session;
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Company:** {}\n", session.company));
    if let Some(ref sector) = session.sector {
        section.push_str(&format!("- **Sector:** {}\n", sector));
    }
    if let Some(ref size) = session.company_size {
        section.push_str(&format!("- **Company Size:** {}\n", size));
    }
    if let Some(ref contact) = session.contact {
        section.push_str(&format!("- **Contact:** {}\n", contact));
    }
    if let Some(ref conducted_by) = session.conducted_by {
        section.push_str(&format!("- **Conducted By:** {}\n", conducted_by));
    }
    section.push_str(&format!("- **Session:** `{}`\n", session.id));
    section.push_str(&format!(
        "- **Created:** {}\n",
        session.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Catalog:** {}\n", assessment.data_source.kind));
    section.push_str(&format!(
        "- **Questions:** {}\n",
        assessment.stats.total_questions
    ));
    section.push_str("\n");

    section
}

/// Generate the table of contents.
fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");
    toc.push_str("- [Maturity by Process](#maturity-by-process)\n");
    toc.push_str("- [Maturity by Domain](#maturity-by-domain)\n");
    toc.push_str("- [Score Matrix](#score-matrix)\n");
    toc.push_str("- [Pareto Gap Analysis](#pareto-gap-analysis)\n");
    toc.push_str("- [Four-Dimension Maturity](#four-dimension-maturity)\n");
    toc.push_str("- [Weak Spots](#weak-spots)\n");
    toc.push_str("\n");

    toc
}

/// Generate the summary section.
fn generate_summary_section(stats: &SessionStats) -> String {
    let mut section = String::new();
    let maturity = MaturityLevel::from_percentage(stats.overall_score);

    section.push_str("## Summary\n\n");
    section.push_str("| Overall Score | Maturity | Completion | Answered | N/A |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| **{:.2}%** | {} {} ({}/5) | {:.2}% | {} | {} |\n\n",
        stats.overall_score,
        maturity.emoji(),
        maturity,
        maturity.level(),
        stats.completion_percentage,
        stats.answered_questions,
        stats.na_questions,
    ));

    // Score histogram over applicable answers
    section.push_str("### Score Distribution\n\n");
    section.push_str("| Score | 0 | 1 | 2 | 3 | 4 | 5 |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| **Answers** | {} | {} | {} | {} | {} | {} |\n\n",
        stats.score_distribution[0],
        stats.score_distribution[1],
        stats.score_distribution[2],
        stats.score_distribution[3],
        stats.score_distribution[4],
        stats.score_distribution[5],
    ));

    section
}

/// Generate a per-process or per-domain maturity table.
fn generate_group_section(
    title: &str,
    label: &str,
    names: &[String],
    groups: &BTreeMap<String, GroupStats>,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));

    if names.is_empty() && groups.is_empty() {
        section.push_str("_Nothing assessed._\n\n");
        return section;
    }

    section.push_str(&format!(
        "| {} | Average | Answered | N/A | Min | Max | Maturity |\n",
        label
    ));
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|:---:|\n");

    // Catalog names first, then any group seen only in the records.
    let extras: Vec<&String> = groups.keys().filter(|k| !names.contains(k)).collect();
    for name in names.iter().chain(extras.into_iter()) {
        let stats = groups.get(name).cloned().unwrap_or_default();
        section.push_str(&generate_group_row(name, &stats));
    }
    section.push_str("\n");

    section
}

/// Generate one row of a maturity table.
fn generate_group_row(name: &str, stats: &GroupStats) -> String {
    let maturity = MaturityLevel::from_percentage(stats.average_score);
    format!(
        "| {} | {:.2}% | {} | {} | {} | {} | {} {} |\n",
        name,
        stats.average_score,
        stats.count,
        stats.na_count,
        format_extremum(stats.lowest_score),
        format_extremum(stats.highest_score),
        maturity.emoji(),
        maturity,
    )
}

fn format_extremum(value: Option<u8>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

/// Generate the process-by-domain matrix section.
fn generate_matrix_section(stats: &SessionStats) -> String {
    let mut section = String::new();

    section.push_str("## Score Matrix\n\n");

    if stats.processes.is_empty() || stats.domains.is_empty() {
        section.push_str("_No catalog resolved; matrix unavailable._\n\n");
        return section;
    }

    section.push_str("Percentage score per process and domain (0 when not assessed).\n\n");

    section.push_str("| Process |");
    for domain in &stats.domains {
        section.push_str(&format!(" {} |", domain));
    }
    section.push_str("\n|:---|");
    for _ in &stats.domains {
        section.push_str(":---:|");
    }
    section.push_str("\n");

    for process in &stats.processes {
        section.push_str(&format!("| {} |", process));
        for domain in &stats.domains {
            let value = stats
                .matrix
                .by_process
                .get(process)
                .and_then(|row| row.get(domain))
                .copied()
                .unwrap_or(0.0);
            section.push_str(&format!(" {:.2} |", value));
        }
        section.push_str("\n");
    }
    section.push_str("\n");

    section
}

/// Generate the Pareto gap analysis section.
fn generate_pareto_section(pareto: &ParetoAnalysis) -> String {
    let mut section = String::new();

    section.push_str("## Pareto Gap Analysis\n\n");

    if pareto.by_process.is_empty() && pareto.by_domain.is_empty() {
        section.push_str("_No catalog resolved; gap analysis unavailable._\n\n");
        return section;
    }

    section.push_str(&format!(
        "Total system gap: **{:.4}**. Entries inside the 80% cumulative \
         cutoff are flagged as critical.\n\n",
        pareto.total_gap_system
    ));

    section.push_str(&generate_pareto_table(
        "Gap by Process",
        "Process",
        &pareto.by_process,
        &pareto.critical_processes,
    ));
    section.push_str(&generate_pareto_table(
        "Gap by Domain",
        "Domain",
        &pareto.by_domain,
        &pareto.critical_domains,
    ));

    section
}

/// Generate one Pareto ranking table.
fn generate_pareto_table(
    title: &str,
    label: &str,
    entries: &[ParetoEntry],
    critical: &[String],
) -> String {
    let mut table = String::new();

    table.push_str(&format!("### {}\n\n", title));
    table.push_str(&format!(
        "| # | {} | Gap | Gap % | Cumulative % | Critical |\n",
        label
    ));
    table.push_str("|:---:|:---|:---:|:---:|:---:|:---:|\n");

    for (i, entry) in entries.iter().enumerate() {
        let flag = if entry.is_critical { "⚠️" } else { "" };
        table.push_str(&format!(
            "| {} | {} | {:.4} | {:.2}% | {:.2}% | {} |\n",
            i + 1,
            entry.name,
            entry.total_gap,
            entry.gap_percentage,
            entry.cumulative_percentage,
            flag,
        ));
    }
    table.push_str("\n");

    if critical.is_empty() {
        table.push_str("**Critical:** none\n\n");
    } else {
        table.push_str(&format!("**Critical:** {}\n\n", critical.join(", ")));
    }

    table
}

/// Generate the four-dimension maturity section.
fn generate_rollup_section(assessment: &Assessment) -> String {
    let mut section = String::new();

    section.push_str("## Four-Dimension Maturity\n\n");

    if assessment.rollup.is_empty() {
        section.push_str("_No processes assessed._\n\n");
        return section;
    }

    section.push_str("Average maturity (0-5) per process across the four canonical dimensions.\n\n");

    section.push_str("| Process |");
    for dimension in Dimension::ALL {
        section.push_str(&format!(" {} |", dimension));
    }
    section.push_str(" Overall |\n|:---|");
    for _ in Dimension::ALL {
        section.push_str(":---:|");
    }
    section.push_str(":---:|\n");

    for rollup in &assessment.rollup {
        section.push_str(&format!("| {} |", rollup.process));
        for dimension in Dimension::ALL {
            section.push_str(&format!(" {:.2} |", rollup.dimensions.get(dimension)));
        }
        // Rollups run 0-5; maturity bands are defined on percentages.
        let maturity = MaturityLevel::from_percentage(rollup.overall_score * 20.0);
        section.push_str(&format!(
            " {} **{:.2}** |\n",
            maturity.emoji(),
            rollup.overall_score
        ));
    }
    section.push_str("\n");

    section
}

/// Generate the weak spots section.
fn generate_weak_spots_section(weak_spots: &[AnswerRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Weak Spots\n\n");

    if weak_spots.is_empty() {
        section.push_str("No weak spots: every answered question scored 3 or above. 🎉\n\n");
        return section;
    }

    section.push_str("Questions scored below 3, excluding N/A answers:\n\n");
    section.push_str("| Process | Activity | Domain | Question | Score |\n");
    section.push_str("|:---|:---|:---|:---|:---:|\n");

    for record in weak_spots.iter().take(WEAK_SPOT_LIMIT) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            record.process, record.activity, record.category, record.dimension, record.score,
        ));
    }
    section.push_str("\n");

    if weak_spots.len() > WEAK_SPOT_LIMIT {
        section.push_str(&format!(
            "_... and {} more._\n\n",
            weak_spots.len() - WEAK_SPOT_LIMIT
        ));
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by gapscan v{} on {}*\n",
        env!("CARGO_PKG_VERSION"),
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(assessment: &Assessment) -> Result<String> {
    serde_json::to_string_pretty(assessment).map_err(Into::into)
}
