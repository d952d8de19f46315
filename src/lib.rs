//! Gap analysis engine for digital maturity assessments.
//!
//! Gapscan aggregates the scored answers of an assessment session into
//! per-process and per-domain maturity statistics, a process-by-domain
//! score matrix, Pareto gap rankings with an 80% criticality cutoff,
//! and a four-dimension maturity rollup.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod pareto;
pub mod projector;
pub mod report;
pub mod rollup;
pub mod stats;
pub mod store;

pub use engine::{Assessment, Engine};
pub use error::{CatalogError, EngineError};
