//! Report generation modules.
//!
//! This module renders a finished assessment into Markdown or JSON.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report};
