//! PostgreSQL implementation of the RecordStore trait.

use async_trait::async_trait;
use qcforms_core::TableSpec;
use serde_json::Value;
use sqlx_postgres::PgPool;

use qcforms_storage::{RecordStore, StorageError, StorageId, StoredRow};

use crate::config::PostgresConfig;
use crate::migrations;
use crate::pool;
use crate::queries::crud;

/// PostgreSQL record store, one table per form kind.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new `PostgresStore` with the given configuration.
    ///
    /// This will:
    /// 1. Create a connection pool
    /// 2. Run migrations (if configured)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Creates a new `PostgresStore` from an existing connection pool.
    ///
    /// Migrations are not run automatically when using this constructor.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn find_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StoredRow>, StorageError> {
        crud::find_by_key(&self.pool, table, key).await
    }

    async fn find_id_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StorageId>, StorageError> {
        crud::find_id_by_key(&self.pool, table, key).await
    }

    async fn insert(&self, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError> {
        crud::insert(&self.pool, table, row).await
    }

    async fn update_by_id(
        &self,
        table: &TableSpec,
        id: &StorageId,
        row: &Value,
        if_match: Option<&str>,
    ) -> Result<StoredRow, StorageError> {
        crud::update_by_id(&self.pool, table, id, row, if_match).await
    }

    async fn list_keys(&self, table: &TableSpec) -> Result<Vec<String>, StorageError> {
        crud::list_keys(&self.pool, table).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
