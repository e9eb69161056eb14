//! Session error types
//!
//! Every error either fully completes or fully no-ops the operation that
//! raised it; no variant may leave a session in an inconsistent phase.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Caller-supplied input was missing or malformed. Nothing was mutated.
    #[error("{0}")]
    Input(String),

    /// A remote collaborator failed while the operation needed it to
    /// proceed. Fire-and-forget failures are logged instead.
    #[error("{0}")]
    Upstream(String),

    /// Operation not valid in the current phase, or out of turn. Rejected
    /// synchronously with no state change.
    #[error("{0}")]
    IllegalOperation(String),

    /// Stored data could not be repaired by the sanitation pipeline.
    #[error("{0}")]
    Data(String),

    #[error("Analysis not found: {0}")]
    AnalysisNotFound(String),

    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<coach_core::record::RecordError> for SessionError {
    fn from(err: coach_core::record::RecordError) -> Self {
        SessionError::Data(err.to_string())
    }
}
