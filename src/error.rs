//! Error types for catalog resolution and engine operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while loading or resolving a question catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog '{name}' is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("template version not found: {0}")]
    UnknownTemplateVersion(Uuid),
}

/// Errors raised by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("failed to load session data: {0}")]
    Store(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
