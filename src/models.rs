//! Data models for the assessment engine.
//!
//! This module contains all the core data structures used throughout
//! the application for representing answers, catalogs, statistics,
//! gap rankings, and maturity rollups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Catalog a session falls back to when it does not name one.
pub const DEFAULT_MODEL_NAME: &str = "i40_assessment_fto";

/// One scored survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Process the question belongs to.
    pub process: String,
    /// Activity within the process.
    pub activity: String,
    /// Free-text domain label (e.g. "Governance").
    pub category: String,
    /// Question text.
    pub dimension: String,
    /// Score in the 0-5 range (0 also means "not yet answered").
    #[serde(default)]
    pub score: u8,
    /// Optional free-text note attached by the assessor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Marked not applicable: excluded from every average, kept in totals.
    #[serde(default)]
    pub is_not_applicable: bool,
}

impl AnswerRecord {
    /// Whether this record participates in score averages.
    pub fn is_applicable(&self) -> bool {
        !self.is_not_applicable
    }

    /// Natural join key against the question catalog.
    pub fn catalog_key(&self) -> (&str, &str, &str, &str) {
        (
            self.process.as_str(),
            self.activity.as_str(),
            self.category.as_str(),
            self.dimension.as_str(),
        )
    }
}

fn default_max_score() -> u8 {
    5
}

/// One question definition from either catalog representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Process the question belongs to.
    pub process: String,
    /// Activity within the process.
    pub activity: String,
    /// Free-text domain label.
    pub category: String,
    /// Question text.
    pub dimension: String,
    /// Display/sort rank within the catalog.
    pub order: usize,
    /// Maximum attainable score, normally 5.
    #[serde(default = "default_max_score")]
    pub max_score: u8,
}

impl CatalogEntry {
    /// Canonical ordering key, unique within a catalog.
    pub fn catalog_key(&self) -> (&str, &str, &str, &str) {
        (
            self.process.as_str(),
            self.activity.as_str(),
            self.category.as_str(),
            self.dimension.as_str(),
        )
    }
}

/// Metadata for one assessment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSession {
    /// Unique session identifier.
    pub id: Uuid,
    /// Company being assessed.
    pub company: String,
    /// Industry sector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Company size band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    /// Contact person at the company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Who ran the assessment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conducted_by: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Legacy flat-file catalog name, when not bound to a template version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Versioned template this session is bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version_id: Option<Uuid>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was closed, if it has been.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    /// Legacy catalog name this session resolves to when no template
    /// version is set.
    pub fn catalog_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }
}

/// Portable session bundle: the session plus all of its answer records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    /// Session metadata.
    pub session: AssessmentSession,
    /// Every answer record belonging to the session.
    pub results: Vec<AnswerRecord>,
}

/// Which catalog representation a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceKind {
    /// Flat-file catalog, addressed by model name.
    Legacy {
        /// Name of the flat-file model.
        model: String,
    },
    /// Relationally stored template version.
    Versioned {
        /// Template version identifier.
        version_id: Uuid,
    },
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Legacy { model } => write!(f, "legacy ({})", model),
            SourceKind::Versioned { version_id } => write!(f, "versioned ({})", version_id),
        }
    }
}

/// Resolved catalog view for one session. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// Representation the session is bound to.
    #[serde(flatten)]
    pub kind: SourceKind,
    /// Ordered distinct process names.
    pub processes: Vec<String>,
    /// Ordered distinct domain names.
    pub domains: Vec<String>,
    /// Question definitions, empty for legacy sources.
    pub catalog_entries: Vec<CatalogEntry>,
}

impl DataSource {
    /// An empty source of the given kind (e.g. missing legacy file).
    pub fn empty(kind: SourceKind) -> Self {
        Self {
            kind,
            processes: Vec::new(),
            domains: Vec::new(),
            catalog_entries: Vec::new(),
        }
    }
}

/// An answer record annotated for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedRecord {
    /// The underlying answer record.
    #[serde(flatten)]
    pub record: AnswerRecord,
    /// Mean score of all applicable records sharing this record's process.
    pub process_rating: f64,
}

/// Score accumulation for one process or domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Percentage score: total over maximum, 0 when nothing is applicable.
    pub average_score: f64,
    /// Sum of applicable scores.
    pub total_score: u32,
    /// Sum of attainable scores over applicable records.
    pub max_score: u32,
    /// Number of applicable records.
    pub count: usize,
    /// Number of not-applicable records.
    pub na_count: usize,
    /// Lowest applicable score seen, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_score: Option<u8>,
    /// Highest applicable score seen, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_score: Option<u8>,
}

/// Process-by-domain average matrix, emitted in both orientations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreMatrix {
    /// Percentage averages keyed by process, then domain.
    pub by_process: BTreeMap<String, BTreeMap<String, f64>>,
    /// The same averages keyed by domain, then process.
    pub by_domain: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Complete aggregated statistics for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Total number of answer records.
    pub total_questions: usize,
    /// Records not marked not-applicable.
    pub answered_questions: usize,
    /// Records marked not-applicable.
    pub na_questions: usize,
    /// Answered over total, as a percentage.
    pub completion_percentage: f64,
    /// System-wide percentage score over applicable records.
    pub overall_score: f64,
    /// Per-process accumulation.
    pub by_process: BTreeMap<String, GroupStats>,
    /// Per-domain accumulation.
    pub by_domain: BTreeMap<String, GroupStats>,
    /// Process-by-domain averages in both orientations.
    pub matrix: ScoreMatrix,
    /// Counts of applicable answers at each score value 0 through 5.
    pub score_distribution: [usize; 6],
    /// Canonical process list from the resolved catalog.
    pub processes: Vec<String>,
    /// Canonical domain list from the resolved catalog.
    pub domains: Vec<String>,
}

/// Maturity band for a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaturityLevel {
    /// Below 40%.
    Critical,
    /// 40% to 50%.
    Lacking,
    /// 50% to 70%.
    Adequate,
    /// 70% to 80%.
    Good,
    /// 80% and above.
    Excellent,
}

impl MaturityLevel {
    /// Classifies a 0-100 percentage score into a maturity band.
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 80.0 {
            MaturityLevel::Excellent
        } else if pct >= 70.0 {
            MaturityLevel::Good
        } else if pct >= 50.0 {
            MaturityLevel::Adequate
        } else if pct >= 40.0 {
            MaturityLevel::Lacking
        } else {
            MaturityLevel::Critical
        }
    }

    /// Numeric level from 1 (critical) to 5 (excellent).
    pub fn level(&self) -> u8 {
        match self {
            MaturityLevel::Critical => 1,
            MaturityLevel::Lacking => 2,
            MaturityLevel::Adequate => 3,
            MaturityLevel::Good => 4,
            MaturityLevel::Excellent => 5,
        }
    }

    /// Returns an emoji representation of the maturity band.
    pub fn emoji(&self) -> &'static str {
        match self {
            MaturityLevel::Critical => "🔴",
            MaturityLevel::Lacking => "🟠",
            MaturityLevel::Adequate => "🟡",
            MaturityLevel::Good => "🔵",
            MaturityLevel::Excellent => "🟢",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaturityLevel::Critical => write!(f, "Critical"),
            MaturityLevel::Lacking => write!(f, "Lacking"),
            MaturityLevel::Adequate => write!(f, "Adequate"),
            MaturityLevel::Good => write!(f, "Good"),
            MaturityLevel::Excellent => write!(f, "Excellent"),
        }
    }
}

/// One row of a Pareto gap ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry {
    /// Process or domain name.
    pub name: String,
    /// Summed normalized gap, rounded to 4 decimals.
    pub total_gap: f64,
    /// Share of the system-wide gap, rounded to 2 decimals.
    pub gap_percentage: f64,
    /// Running share down the sorted ranking, rounded to 2 decimals.
    pub cumulative_percentage: f64,
    /// Inside the 80% cumulative cutoff.
    pub is_critical: bool,
}

/// Gap rankings over both axes of the process-by-domain matrix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParetoAnalysis {
    /// Processes ranked by gap share, descending.
    pub by_process: Vec<ParetoEntry>,
    /// Domains ranked by gap share, descending.
    pub by_domain: Vec<ParetoEntry>,
    /// System-wide gap total, rounded to 4 decimals.
    pub total_gap_system: f64,
    /// Names of processes inside the 80% cutoff, in rank order.
    pub critical_processes: Vec<String>,
    /// Names of domains inside the 80% cutoff, in rank order.
    pub critical_domains: Vec<String>,
}

/// The four canonical maturity dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Governance,
    MonitoringControl,
    Technology,
    Organization,
}

impl Dimension {
    /// All dimensions in canonical display order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Governance,
        Dimension::MonitoringControl,
        Dimension::Technology,
        Dimension::Organization,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Governance => write!(f, "Governance"),
            Dimension::MonitoringControl => write!(f, "Monitoring & Control"),
            Dimension::Technology => write!(f, "Technology"),
            Dimension::Organization => write!(f, "Organization"),
        }
    }
}

/// Rollup values for the four canonical dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    /// Governance rollup value.
    pub governance: f64,
    /// Monitoring & Control rollup value.
    pub monitoring_control: f64,
    /// Technology rollup value.
    pub technology: f64,
    /// Organization rollup value.
    pub organization: f64,
}

impl DimensionScores {
    /// Reads the value for one dimension.
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Governance => self.governance,
            Dimension::MonitoringControl => self.monitoring_control,
            Dimension::Technology => self.technology,
            Dimension::Organization => self.organization,
        }
    }

    /// Writes the value for one dimension.
    pub fn set(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Governance => self.governance = value,
            Dimension::MonitoringControl => self.monitoring_control = value,
            Dimension::Technology => self.technology = value,
            Dimension::Organization => self.organization = value,
        }
    }
}

/// Four-dimension maturity rollup for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRollup {
    /// Process name.
    pub process: String,
    /// Per-dimension rollup values on the 0-5 scale.
    pub dimensions: DimensionScores,
    /// Mean of the nonzero dimension values.
    pub overall_score: f64,
}

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.234567), 1.2346);
        assert_eq!(round4(0.00004), 0.0);
    }

    #[test]
    fn test_maturity_from_percentage() {
        assert_eq!(MaturityLevel::from_percentage(85.0), MaturityLevel::Excellent);
        assert_eq!(MaturityLevel::from_percentage(80.0), MaturityLevel::Excellent);
        assert_eq!(MaturityLevel::from_percentage(75.0), MaturityLevel::Good);
        assert_eq!(MaturityLevel::from_percentage(60.0), MaturityLevel::Adequate);
        assert_eq!(MaturityLevel::from_percentage(45.0), MaturityLevel::Lacking);
        assert_eq!(MaturityLevel::from_percentage(10.0), MaturityLevel::Critical);
    }

    #[test]
    fn test_maturity_level_numbers() {
        assert_eq!(MaturityLevel::Excellent.level(), 5);
        assert_eq!(MaturityLevel::Critical.level(), 1);
        assert!(MaturityLevel::Critical < MaturityLevel::Excellent);
    }

    #[test]
    fn test_session_catalog_name_default() {
        let session = AssessmentSession {
            id: Uuid::new_v4(),
            company: "Acme".to_string(),
            sector: None,
            company_size: None,
            contact: None,
            conducted_by: None,
            email: None,
            model_name: None,
            template_version_id: None,
            created_at: Utc::now(),
            closed_at: None,
        };
        assert_eq!(session.catalog_name(), DEFAULT_MODEL_NAME);

        let named = AssessmentSession {
            model_name: Some("custom_model".to_string()),
            ..session
        };
        assert_eq!(named.catalog_name(), "custom_model");
    }

    #[test]
    fn test_dimension_scores_roundtrip() {
        let mut scores = DimensionScores::default();
        scores.set(Dimension::Technology, 3.5);
        assert_eq!(scores.get(Dimension::Technology), 3.5);
        assert_eq!(scores.get(Dimension::Governance), 0.0);
    }

    #[test]
    fn test_answer_record_applicability() {
        let record = AnswerRecord {
            process: "P1".to_string(),
            activity: "A1".to_string(),
            category: "Governance".to_string(),
            dimension: "Q1".to_string(),
            score: 3,
            note: None,
            is_not_applicable: false,
        };
        assert!(record.is_applicable());
        assert_eq!(record.catalog_key(), ("P1", "A1", "Governance", "Q1"));
    }
}
