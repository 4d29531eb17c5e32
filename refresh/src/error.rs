//! Error types and result definitions for refresh runs.

use config::shared::ValidationError;
use thiserror::Error;

/// Convenient result type for refresh operations using [`RefreshError`] as the error type.
pub type RefreshResult<T> = Result<T, RefreshError>;

/// Errors that abort a full refresh run.
///
/// Every variant is fatal to the run: the engine never retries a failed
/// statement and prefers restart-from-scratch over resuming, since the shadow
/// table is disposable and cheap to recreate.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// A required option is missing or invalid. Raised before any database
    /// access.
    #[error("invalid refresh configuration: {0}")]
    Config(#[from] ValidationError),

    /// The captured DDL did not match the expected shape. Carries the raw DDL
    /// text so the operator sees exactly what could not be rewritten instead
    /// of a guessed, subtly invalid substitution.
    #[error("could not derive the shadow table DDL ({reason}): {ddl}")]
    SchemaParse {
        reason: &'static str,
        ddl: String,
    },

    /// A statement failed on either session.
    #[error("statement execution failed: {0}")]
    Execution(#[from] sqlx::Error),
}
