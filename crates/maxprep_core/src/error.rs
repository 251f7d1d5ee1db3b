use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for scene-analysis preparation.
#[derive(Error, Debug)]
pub enum MaxprepError {
    /// A required input path (scene file, workspace, analyzer exe) does not
    /// exist on the filesystem. Raised at construction or validation time and
    /// never recovered internally.
    #[error("{} is not found", .0.display())]
    MissingInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A result file produced by the analyzer could not be parsed.
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The reloaded task description lacks a section the reconciliation
    /// step depends on.
    #[error("task description has no {0} section")]
    MalformedTask(&'static str),
}

pub type Result<T> = std::result::Result<T, MaxprepError>;

impl MaxprepError {
    pub fn is_missing_input(&self) -> bool {
        matches!(self, MaxprepError::MissingInput(_))
    }
}
