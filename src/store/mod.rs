//! Persistence seams for sessions, answers, and catalogs.
//!
//! The engine never talks to storage directly: callers hand it trait
//! objects. `FileStore` reads the portable JSON layout (sessions/,
//! models/, templates/ under a data directory) and `MemoryStore` backs
//! tests and embedded callers.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::catalog::legacy::LegacyModel;
use crate::error::{CatalogError, EngineError};
use crate::models::{AnswerRecord, AssessmentSession, CatalogEntry, SessionExport};

/// Looks up session metadata.
pub trait SessionStore {
    /// Fetches one session by id, or `None` when it does not exist.
    fn fetch_session(&self, id: Uuid) -> Result<Option<AssessmentSession>, EngineError>;

    /// Lists all known sessions, newest first.
    fn list_sessions(&self) -> Result<Vec<AssessmentSession>, EngineError>;
}

/// Fetches the full answer set of a session.
pub trait ResultStore {
    /// All answer records for a session, in stored order.
    fn fetch_results(&self, session_id: Uuid) -> Result<Vec<AnswerRecord>, EngineError>;
}

/// Fetches legacy flat-file catalogs by model name.
pub trait LegacyCatalogStore {
    /// The named model, or `None` when the file does not exist.
    fn fetch_model(&self, name: &str) -> Result<Option<LegacyModel>, CatalogError>;
}

/// Fetches versioned template catalogs.
pub trait TemplateStore {
    /// Catalog entries of one template version ordered by rank, or
    /// `None` when the version does not exist.
    fn fetch_entries(&self, version_id: Uuid) -> Result<Option<Vec<CatalogEntry>>, CatalogError>;
}

fn default_max_score() -> u8 {
    5
}

/// One question row inside a template version export file.
#[derive(Debug, Clone, Deserialize)]
struct TemplateQuestion {
    text: String,
    #[serde(default)]
    process: Option<String>,
    #[serde(default)]
    activity: Option<String>,
    #[serde(default)]
    category: Option<String>,
    order: usize,
    #[serde(default = "default_max_score")]
    max_score: u8,
}

/// One domain grouping inside a template version export file.
#[derive(Debug, Clone, Deserialize)]
struct TemplateDomainExport {
    #[serde(default)]
    questions: Vec<TemplateQuestion>,
}

/// A template version export file: domains with their questions.
#[derive(Debug, Clone, Deserialize)]
struct TemplateExport {
    #[serde(default)]
    domains: Vec<TemplateDomainExport>,
}

/// Directory-backed store over the portable JSON layout.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root data directory this store reads from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.sessions_dir().join(format!("{}.json", id))
    }

    fn model_path(&self, name: &str) -> PathBuf {
        self.data_dir.join("models").join(format!("{}.json", name))
    }

    fn template_path(&self, version_id: Uuid) -> PathBuf {
        self.data_dir
            .join("templates")
            .join(format!("{}.json", version_id))
    }

    fn read_export(&self, path: &Path) -> Result<SessionExport, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Store(format!("failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| EngineError::Store(format!("failed to parse {}: {}", path.display(), e)))
    }
}

impl SessionStore for FileStore {
    fn fetch_session(&self, id: Uuid) -> Result<Option<AssessmentSession>, EngineError> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let export = self.read_export(&path)?;
        Ok(Some(export.session))
    }

    fn list_sessions(&self) -> Result<Vec<AssessmentSession>, EngineError> {
        let dir = self.sessions_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_export(path) {
                Ok(export) => sessions.push(export.session),
                Err(e) => warn!("Skipping unreadable session file {}: {}", path.display(), e),
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!("Found {} session(s) in {}", sessions.len(), dir.display());
        Ok(sessions)
    }
}

impl ResultStore for FileStore {
    fn fetch_results(&self, session_id: Uuid) -> Result<Vec<AnswerRecord>, EngineError> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let export = self.read_export(&path)?;
        Ok(export.results)
    }
}

impl LegacyCatalogStore for FileStore {
    fn fetch_model(&self, name: &str) -> Result<Option<LegacyModel>, CatalogError> {
        let path = self.model_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CatalogError::Io {
            name: name.to_string(),
            source: e,
        })?;
        let model = serde_json::from_str(&content).map_err(|e| CatalogError::Malformed {
            name: name.to_string(),
            source: e,
        })?;
        Ok(Some(model))
    }
}

impl TemplateStore for FileStore {
    fn fetch_entries(&self, version_id: Uuid) -> Result<Option<Vec<CatalogEntry>>, CatalogError> {
        let path = self.template_path(version_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CatalogError::Io {
            name: version_id.to_string(),
            source: e,
        })?;
        let export: TemplateExport =
            serde_json::from_str(&content).map_err(|e| CatalogError::Malformed {
                name: version_id.to_string(),
                source: e,
            })?;

        let mut entries: Vec<CatalogEntry> = Vec::new();
        for domain in export.domains {
            for question in domain.questions {
                entries.push(CatalogEntry {
                    process: question.process.unwrap_or_default(),
                    activity: question.activity.unwrap_or_default(),
                    category: question.category.unwrap_or_default(),
                    dimension: question.text,
                    order: question.order,
                    max_score: question.max_score,
                });
            }
        }
        entries.sort_by_key(|e| e.order);
        Ok(Some(entries))
    }
}

/// In-memory store for tests and embedded callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Session bundles keyed implicitly by their session id.
    pub exports: Vec<SessionExport>,
    /// Legacy models by name.
    pub models: BTreeMap<String, LegacyModel>,
    /// Template catalogs by version id.
    pub templates: BTreeMap<Uuid, Vec<CatalogEntry>>,
}

impl MemoryStore {
    /// A store holding a single session bundle.
    pub fn with_export(export: SessionExport) -> Self {
        Self {
            exports: vec![export],
            ..Self::default()
        }
    }

    /// Registers a legacy model under the given name.
    pub fn insert_model(&mut self, name: impl Into<String>, model: LegacyModel) {
        self.models.insert(name.into(), model);
    }

    /// Registers a template catalog under the given version id.
    pub fn insert_template(&mut self, version_id: Uuid, entries: Vec<CatalogEntry>) {
        self.templates.insert(version_id, entries);
    }
}

impl SessionStore for MemoryStore {
    fn fetch_session(&self, id: Uuid) -> Result<Option<AssessmentSession>, EngineError> {
        Ok(self
            .exports
            .iter()
            .find(|e| e.session.id == id)
            .map(|e| e.session.clone()))
    }

    fn list_sessions(&self) -> Result<Vec<AssessmentSession>, EngineError> {
        let mut sessions: Vec<AssessmentSession> =
            self.exports.iter().map(|e| e.session.clone()).collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }
}

impl ResultStore for MemoryStore {
    fn fetch_results(&self, session_id: Uuid) -> Result<Vec<AnswerRecord>, EngineError> {
        Ok(self
            .exports
            .iter()
            .find(|e| e.session.id == session_id)
            .map(|e| e.results.clone())
            .unwrap_or_default())
    }
}

impl LegacyCatalogStore for MemoryStore {
    fn fetch_model(&self, name: &str) -> Result<Option<LegacyModel>, CatalogError> {
        Ok(self.models.get(name).cloned())
    }
}

impl TemplateStore for MemoryStore {
    fn fetch_entries(&self, version_id: Uuid) -> Result<Option<Vec<CatalogEntry>>, CatalogError> {
        Ok(self.templates.get(&version_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_session(id: Uuid) -> AssessmentSession {
        AssessmentSession {
            id,
            company: "Acme".to_string(),
            sector: Some("Manufacturing".to_string()),
            company_size: None,
            contact: None,
            conducted_by: None,
            email: None,
            model_name: None,
            template_version_id: None,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    fn make_record(process: &str, score: u8) -> AnswerRecord {
        AnswerRecord {
            process: process.to_string(),
            activity: "A1".to_string(),
            category: "Governance".to_string(),
            dimension: "Q1".to_string(),
            score,
            note: None,
            is_not_applicable: false,
        }
    }

    fn write_export(dir: &Path, export: &SessionExport) {
        let sessions = dir.join("sessions");
        std::fs::create_dir_all(&sessions).unwrap();
        let path = sessions.join(format!("{}.json", export.session.id));
        std::fs::write(path, serde_json::to_string_pretty(export).unwrap()).unwrap();
    }

    #[test]
    fn test_file_store_session_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let export = SessionExport {
            session: make_session(id),
            results: vec![make_record("Design", 3), make_record("Production", 4)],
        };
        write_export(tmp.path(), &export);

        let store = FileStore::new(tmp.path());
        let session = store.fetch_session(id).unwrap().unwrap();
        assert_eq!(session.company, "Acme");

        let results = store.fetch_results(id).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].process, "Design");
    }

    #[test]
    fn test_file_store_missing_session() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.fetch_session(Uuid::new_v4()).unwrap().is_none());
        assert!(store.fetch_results(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_file_store_list_sessions_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let older = Uuid::new_v4();
        let newer = Uuid::new_v4();

        let mut old_session = make_session(older);
        old_session.created_at = Utc::now() - chrono::Duration::days(2);
        write_export(
            tmp.path(),
            &SessionExport {
                session: old_session,
                results: vec![],
            },
        );
        write_export(
            tmp.path(),
            &SessionExport {
                session: make_session(newer),
                results: vec![],
            },
        );
        // Non-JSON files are skipped.
        std::fs::write(tmp.path().join("sessions").join("notes.txt"), "x").unwrap();

        let store = FileStore::new(tmp.path());
        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, newer);
        assert_eq!(sessions[1].id, older);
    }

    #[test]
    fn test_file_store_missing_model_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.fetch_model("absent").unwrap().is_none());
    }

    #[test]
    fn test_file_store_malformed_model() {
        let tmp = tempfile::tempdir().unwrap();
        let models = tmp.path().join("models");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::write(models.join("broken.json"), "{not json").unwrap();

        let store = FileStore::new(tmp.path());
        let err = store.fetch_model("broken").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn test_file_store_template_entries_sorted_by_order() {
        let tmp = tempfile::tempdir().unwrap();
        let templates = tmp.path().join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        let version_id = Uuid::new_v4();
        let export = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "version": 1,
            "domains": [
                {
                    "domain_code": "technology",
                    "domain_name": "Technology",
                    "order": 2,
                    "weight": 1.0,
                    "questions": [
                        {"text": "Q3", "process": "P2", "activity": "A1", "category": "Technology", "order": 3},
                        {"text": "Q1", "process": "P1", "activity": "A1", "category": "Technology", "order": 1}
                    ]
                },
                {
                    "domain_code": "governance",
                    "domain_name": "Governance",
                    "order": 1,
                    "weight": 1.0,
                    "questions": [
                        {"text": "Q2", "process": "P1", "activity": "A2", "category": "Governance", "order": 2}
                    ]
                }
            ]
        }"#;
        std::fs::write(templates.join(format!("{}.json", version_id)), export).unwrap();

        let store = FileStore::new(tmp.path());
        let entries = store.fetch_entries(version_id).unwrap().unwrap();
        assert_eq!(entries.len(), 3);
        let dims: Vec<&str> = entries.iter().map(|e| e.dimension.as_str()).collect();
        assert_eq!(dims, vec!["Q1", "Q2", "Q3"]);
        assert!(entries.iter().all(|e| e.max_score == 5));
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let id = Uuid::new_v4();
        let export = SessionExport {
            session: make_session(id),
            results: vec![make_record("Design", 2)],
        };
        let mut store = MemoryStore::with_export(export);
        store.insert_model("demo", LegacyModel::default());

        assert!(store.fetch_session(id).unwrap().is_some());
        assert!(store.fetch_session(Uuid::new_v4()).unwrap().is_none());
        assert_eq!(store.fetch_results(id).unwrap().len(), 1);
        assert!(store.fetch_model("demo").unwrap().is_some());
        assert!(store.fetch_model("other").unwrap().is_none());
        assert!(store.fetch_entries(Uuid::new_v4()).unwrap().is_none());
    }
}
