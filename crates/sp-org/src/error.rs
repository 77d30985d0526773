//! Error types for sp-org

use thiserror::Error;

/// Org operation errors. Any of these fails a whole request, as opposed to
/// per-record failures reported inside [`crate::SaveResult`].
#[derive(Error, Debug)]
pub enum OrgError {
    /// Object type not found (O001)
    #[error("[O001] Object type not found: {0}")]
    SObjectNotFound(String),

    /// Query rejected or failed (O002)
    #[error("[O002] Query failed: {0}")]
    QueryError(String),

    /// Request failed as a whole (O003)
    #[error("[O003] Request failed: {0}")]
    ExecutionError(String),

    /// Snapshot file could not be read or parsed (O004)
    #[error("[O004] Failed to load snapshot '{path}': {message}")]
    SnapshotError { path: String, message: String },

    /// Mutex poisoned (O005)
    #[error("[O005] Org state mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// IO error (O006)
    #[error("[O006] IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for OrgError
pub type OrgResult<T> = Result<T, OrgError>;
