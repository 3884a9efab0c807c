//! PostgreSQL record store for the QC forms.
//!
//! This crate provides a PostgreSQL implementation of the `RecordStore` trait
//! from `qcforms-storage`. Each form kind maps to its own table with the
//! business key and secondary identifiers under unique constraints.
//!
//! # Example
//!
//! ```ignore
//! use qcforms_core::{FormSchema, ReleaseForm};
//! use qcforms_db_postgres::{PostgresConfig, PostgresStore};
//! use qcforms_storage::RecordStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PostgresConfig::new("postgres://qc:qc@localhost/qcforms")
//!     .with_pool_size(10)
//!     .with_run_migrations(true);
//!
//! let store = PostgresStore::new(config).await?;
//! let row = store.find_by_key(&ReleaseForm::TABLE, "1001").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration types for the store
//! - [`error`]: Error types specific to PostgreSQL operations
//! - [`pool`]: Connection pool management
//! - [`storage`]: Main `RecordStore` implementation
//! - [`queries`]: SQL query implementations
//! - [`migrations`]: Database migration management

mod config;
mod error;
mod pool;
mod storage;

/// Database migrations module.
pub mod migrations;

/// SQL query implementations.
pub mod queries;

pub use config::PostgresConfig;
pub use error::{PostgresError, Result, constraint_column, map_query_error};
pub use pool::{PgPoolOptions, create_pool, mask_password, pool_options};
pub use storage::PostgresStore;

pub use qcforms_storage::{RecordStore, StorageError, StoredRow};

/// Type alias for a shareable PostgresStore instance.
pub type DynPostgresStore = std::sync::Arc<PostgresStore>;

/// Connects, migrates when configured, and returns a shareable store.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or migrations fail.
pub async fn create_record_store(
    config: PostgresConfig,
) -> std::result::Result<qcforms_storage::DynRecordStore, StorageError> {
    let store = PostgresStore::new(config).await?;
    Ok(std::sync::Arc::new(store))
}
