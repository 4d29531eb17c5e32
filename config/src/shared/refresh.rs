use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Options controlling a single full refresh run.
///
/// Immutable after construction; the engine never mutates its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RefreshConfig {
    /// Name of the table to be refreshed.
    pub table_name: String,
    /// Primary key column used to give every page a deterministic,
    /// non-overlapping window.
    pub primary_key: String,
    /// Optional boolean SQL expression restricting which rows are copied.
    pub where_clause: Option<String>,
    /// Number of rows copied per page, between commits.
    pub batch_size: u64,
    /// When enabled, no mutating statement reaches the database.
    pub dry_run: bool,
    /// Optional cap on the average number of copied rows per second.
    pub avg_rows_per_second_cap: Option<u64>,
}

impl RefreshConfig {
    /// Default number of rows copied per page.
    pub const DEFAULT_BATCH_SIZE: u64 = 100;

    /// Validates the [`RefreshConfig`].
    ///
    /// Invalid options are fatal before any database access happens.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.table_name.is_empty() {
            return Err(ValidationError::MissingTableName);
        }

        if self.primary_key.is_empty() {
            return Err(ValidationError::MissingPrimaryKey);
        }

        if self.batch_size == 0 {
            return Err(ValidationError::ZeroBatchSize);
        }

        if self.avg_rows_per_second_cap == Some(0) {
            return Err(ValidationError::ZeroRowsPerSecondCap);
        }

        Ok(())
    }
}
