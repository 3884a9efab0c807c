//! Builds the configured record store.

use std::sync::Arc;

use qcforms_db_memory::InMemoryStore;
use qcforms_db_postgres::PostgresStore;
use qcforms_storage::{DynRecordStore, InstrumentedStore, StorageError};
use tracing::{info, warn};

use crate::config::{StorageBackend, StorageConfig};

/// Opens the backend named in `config`, wrapped with call tracing.
pub async fn open_store(config: &StorageConfig) -> Result<DynRecordStore, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            warn!("Using the in-memory store; records do not outlive this process");
            Ok(Arc::new(InstrumentedStore::new(InMemoryStore::new())))
        }
        StorageBackend::Postgres => {
            let store = PostgresStore::new(config.postgres.clone()).await?;
            info!(
                url = %qcforms_db_postgres::mask_password(&config.postgres.url),
                "Connected to PostgreSQL"
            );
            Ok(Arc::new(InstrumentedStore::new(store)))
        }
    }
}
