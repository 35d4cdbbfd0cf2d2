use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures outside the byte stream itself. Malformed stream contents are
/// reported through [`Termination`](crate::replay::types::Termination).
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to open replay {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReplayError>;
