use thiserror::Error;

/// Errors raised when validating configuration, before any database access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("table name must not be empty")]
    MissingTableName,

    #[error("primary key column must not be empty")]
    MissingPrimaryKey,

    #[error("batch size must be greater than 0")]
    ZeroBatchSize,

    #[error("average rows per second cap must be greater than 0")]
    ZeroRowsPerSecondCap,
}
