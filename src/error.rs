use std::path::PathBuf;

use thiserror::Error;

/// Authoring mistakes in a content contract. These are design-time errors
/// and are reported eagerly, unlike content mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("content path `{path}` is declared by both `{first}` and `{second}`")]
    PathCollision {
        path: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

pub type EngineResult<T> = Result<T, EngineError>;
