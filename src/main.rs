//! Gapscan - Digital Maturity Gap Analyzer
//!
//! A CLI tool that aggregates the answers of an assessment session
//! into maturity statistics, Pareto gap rankings, and a four-dimension
//! maturity rollup.
//!
//! Exit codes:
//!   0 - Success (score at or above --fail-below, or no gate set)
//!   1 - Runtime error (missing session, malformed data, I/O failure)
//!   2 - Overall score below the --fail-below threshold

use anyhow::{Context, Result};
use gapscan::cli::{Args, OutputFormat};
use gapscan::config::Config;
use gapscan::engine::Engine;
use gapscan::models::MaturityLevel;
use gapscan::report;
use gapscan::store::FileStore;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("Gapscan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    match run_analysis(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .gapscan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".gapscan.toml");

    if path.exists() {
        eprintln!("⚠️  .gapscan.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .gapscan.toml")?;

    println!("✅ Created .gapscan.toml with default settings.");
    println!("   Edit it to customize the data directory, output path, and format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
fn run_analysis(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let data_dir = PathBuf::from(&config.data.data_dir);

    // Try to load config from the data directory
    if let Ok(Some(dir_config)) = Config::load_from_dir(&data_dir) {
        info!("Found .gapscan.toml in data directory");
        config = dir_config;
        config.merge_with_args(&args);
    }

    println!("📂 Data directory: {}", data_dir.display());

    let store = FileStore::new(&data_dir);
    let engine = Engine::from_store(&store);

    // Handle --list: print known sessions and exit
    if args.list {
        return handle_list(&engine);
    }

    let session_id = args.session.context("A session id is required")?;

    // Step 1: Load and compute everything for the session
    println!("🔍 Analyzing session: {}", session_id);
    let assessment = engine.assess(session_id)?;

    let session = &assessment.session;
    println!("   Company: {}", session.company);
    println!("   Catalog: {}", assessment.data_source.kind);
    println!(
        "   Questions: {} ({} answered, {} N/A)",
        assessment.stats.total_questions,
        assessment.stats.answered_questions,
        assessment.stats.na_questions
    );

    // Step 2: Generate and save the report
    println!("\n📝 Generating report...");

    let output_path = PathBuf::from(&config.general.output);
    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&assessment)?,
        OutputFormat::Markdown => report::generate_markdown_report(&assessment),
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let stats = &assessment.stats;
    let maturity = MaturityLevel::from_percentage(stats.overall_score);

    println!("\n📊 Assessment Summary:");
    println!(
        "   Overall score: {:.2}% ({} {})",
        stats.overall_score,
        maturity.emoji(),
        maturity
    );
    println!(
        "   Completion: {:.2}% ({} of {} answered)",
        stats.completion_percentage, stats.answered_questions, stats.total_questions
    );
    println!(
        "   Critical processes: {}",
        format_name_list(&assessment.pareto.critical_processes)
    );
    println!(
        "   Critical domains: {}",
        format_name_list(&assessment.pareto.critical_domains)
    );
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-below threshold
    if let Some(threshold) = args.fail_below {
        if stats.overall_score < threshold {
            eprintln!(
                "\n⛔ Overall score {:.2}% is below the {:.2}% threshold. Failing (exit code 2).",
                stats.overall_score, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --list: print known sessions, newest first, and exit.
fn handle_list(engine: &Engine<'_>) -> Result<i32> {
    let sessions = engine.list_sessions()?;

    if sessions.is_empty() {
        println!("\n   No sessions found.");
        return Ok(0);
    }

    println!("\n   Found {} session(s):\n", sessions.len());
    for session in &sessions {
        let status = if session.closed_at.is_some() {
            "closed"
        } else {
            "open"
        };
        let records = engine.fetch_results(session.id)?;
        let answered = records.iter().filter(|r| !r.is_not_applicable).count();
        let completion = if records.is_empty() {
            0.0
        } else {
            answered as f64 / records.len() as f64 * 100.0
        };
        println!(
            "     📋 {} - {} ({}, {}, {:.0}% complete)",
            session.id,
            session.company,
            session.created_at.format("%Y-%m-%d"),
            status,
            completion
        );
    }

    Ok(0)
}

/// Format a name list for terminal output.
fn format_name_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .gapscan.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
