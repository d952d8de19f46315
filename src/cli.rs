//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Gapscan - gap analysis for digital maturity assessments
///
/// Aggregate the answers of an assessment session into maturity
/// statistics, Pareto gap rankings, and a four-dimension rollup.
/// Markdown/JSON reports. Built in Rust.
///
/// Examples:
///   gapscan --session 3f2b8c1e-9d4a-4f6b-8a2e-5c7d9e0f1a2b
///   gapscan --session 3f2b8c1e-9d4a-4f6b-8a2e-5c7d9e0f1a2b --format json -o report.json
///   gapscan --list --data-dir ./data
///   gapscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Assessment session to analyze
    ///
    /// Identifier of a session export under `<data-dir>/sessions/`.
    /// Not required when using --list or --init-config.
    #[arg(
        short,
        long,
        value_name = "UUID",
        required_unless_present_any = ["list", "init_config"]
    )]
    pub session: Option<Uuid>,

    /// Directory holding session, model, and template files
    ///
    /// Expected layout: sessions/<uuid>.json, models/<name>.json,
    /// templates/<uuid>.json. Can also be set via GAPSCAN_DATA_DIR
    /// or .gapscan.toml config.
    #[arg(short, long, value_name = "DIR", env = "GAPSCAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gapscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List known sessions and exit
    #[arg(long)]
    pub list: bool,

    /// Fail if the overall score is below this percentage
    ///
    /// Useful for tracking programs. Exit code 2 when the score is
    /// below the threshold. Values: 0 to 100.
    #[arg(long, value_name = "PCT")]
    pub fail_below: Option<f64>,

    /// Generate a default .gapscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate the quality gate range
        if let Some(threshold) = self.fail_below {
            if !(0.0..=100.0).contains(&threshold) {
                return Err("Fail-below threshold must be between 0 and 100".to_string());
            }
        }

        // Validate the data directory if provided
        if let Some(ref data_dir) = self.data_dir {
            if !data_dir.exists() {
                return Err(format!(
                    "Data directory does not exist: {}",
                    data_dir.display()
                ));
            }
            if !data_dir.is_dir() {
                return Err(format!(
                    "Data path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        if self.session.is_none() && !self.list {
            return Err("A session id is required unless --list is used".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
