//! Error types for sp-engine

use sp_core::CoreError;
use sp_org::OrgError;
use thiserror::Error;

/// Engine execution errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The org rejected a whole request for one object type (X001)
    #[error("[X001] Transport failure while processing {sobject}: {source}")]
    StepFailed {
        sobject: String,
        #[source]
        source: OrgError,
    },

    /// Org error outside of a step (X002)
    #[error("[X002] {0}")]
    Org(#[from] OrgError),

    /// Plan or graph error (X003)
    #[error("[X003] {0}")]
    Core(#[from] CoreError),

    /// Report could not be written (X004)
    #[error("[X004] Failed to write report {path}: {source}")]
    ReportWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (X005)
    #[error("[X005] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Wrap an org error as the failure of one object type's step
    pub fn step(sobject: impl Into<String>, source: OrgError) -> Self {
        EngineError::StepFailed {
            sobject: sobject.into(),
            source,
        }
    }
}
