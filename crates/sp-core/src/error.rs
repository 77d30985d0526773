//! Error types for sp-core

use crate::plan::StepIssue;
use thiserror::Error;

/// Core error type for Seedplan
#[derive(Error, Debug)]
pub enum CoreError {
    /// P001: Plan file is not the expected JSON shape
    #[error("[P001] Failed to parse plan: {message}")]
    PlanParseError { message: String },

    /// P002: One or more steps failed structural validation
    #[error("[P002] Invalid plan: {} step error(s)", issues.len())]
    InvalidPlan { issues: Vec<StepIssue> },

    /// P003: Empty object type name
    #[error("[P003] Empty object type name: {context}")]
    EmptyName { context: String },

    /// G001: Circular dependency remains after pairwise cycle resolution
    #[error("[G001] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// G002: Cycle decider returned an edge outside the presented group
    #[error("[G002] Invalid cycle choice {choice} for {pair} ({available} candidate edge(s))")]
    InvalidCycleChoice {
        pair: String,
        choice: usize,
        available: usize,
    },

    /// G003: Cycle decider could not produce a decision
    #[error("[G003] Cycle resolution aborted for {pair}: {reason}")]
    CycleResolutionAborted { pair: String, reason: String },

    /// Q001: Query is not a `SELECT ... FROM ...` statement
    #[error("[Q001] Unsupported query '{query}': {reason}")]
    QueryParseError { query: String, reason: String },

    /// C001: Config file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse config file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// IO error with file path context
    #[error("[E001] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// IO error
    #[error("[E002] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
