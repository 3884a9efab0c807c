//! Error types for the PostgreSQL record store.

use qcforms_core::TableSpec;
use qcforms_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique violation (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Recovers the column from a default unique constraint name
/// (`<table>_<column>_key`).
pub fn constraint_column(table: &TableSpec, constraint: &str) -> Option<String> {
    let column = constraint
        .strip_prefix(table.name)?
        .strip_prefix('_')?
        .strip_suffix("_key")?;
    table.is_unique(column).then(|| column.to_string())
}

/// Maps a failed query to the storage taxonomy.
pub fn map_query_error(table: &TableSpec, operation: &str, err: SqlxError) -> StorageError {
    if has_pg_error_code(&err, PG_UNIQUE_VIOLATION) {
        let column = match &err {
            SqlxError::Database(db_err) => db_err
                .constraint()
                .and_then(|c| constraint_column(table, c)),
            _ => None,
        };
        return StorageError::unique_violation(table.name, column);
    }
    match err {
        SqlxError::Io(_) | SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Tls(_) => {
            StorageError::connection_error(format!("{operation} on {}: {err}", table.name))
        }
        other => StorageError::internal(format!("Failed to {operation} on {}: {other}", table.name)),
    }
}

/// Errors specific to the PostgreSQL record store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
