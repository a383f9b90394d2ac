//src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a trimming run.
///
/// Recoverable conditions (missing adapters file, unparseable phred hint,
/// undecodable stderr) never show up here: they are absorbed where they occur.
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed trim log {path} at line {line}: {reason}")]
    TrimLogParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not write CSV report: {0}")]
    Report(#[from] csv::Error),

    #[error("could not serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrimError {
    /// Wrap an `io::Error` together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrimError::Io {
            path: path.into(),
            source,
        }
    }
}
