//! Tracing wrapper around any [`RecordStore`].
//!
//! Every call is delegated unchanged to the inner store; the wrapper only
//! records the backend, table, operation and latency of each call.

use std::time::Instant;

use async_trait::async_trait;
use qcforms_core::TableSpec;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::traits::RecordStore;
use crate::types::{StorageId, StoredRow};

pub struct InstrumentedStore<S: RecordStore> {
    inner: S,
}

impl<S: RecordStore> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        table: &TableSpec,
        started: Instant,
        result: &Result<T, StorageError>,
    ) {
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(_) => debug!(
                backend = self.inner.backend_name(),
                table = table.name,
                operation,
                elapsed_ms,
                "Store call completed"
            ),
            Err(e) => warn!(
                backend = self.inner.backend_name(),
                table = table.name,
                operation,
                elapsed_ms,
                category = %e.category(),
                error = %e,
                "Store call failed"
            ),
        }
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for InstrumentedStore<S> {
    async fn find_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StoredRow>, StorageError> {
        let started = Instant::now();
        let result = self.inner.find_by_key(table, key).await;
        self.observe("find_by_key", table, started, &result);
        result
    }

    async fn find_id_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StorageId>, StorageError> {
        let started = Instant::now();
        let result = self.inner.find_id_by_key(table, key).await;
        self.observe("find_id_by_key", table, started, &result);
        result
    }

    async fn insert(&self, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError> {
        let started = Instant::now();
        let result = self.inner.insert(table, row).await;
        self.observe("insert", table, started, &result);
        result
    }

    async fn update_by_id(
        &self,
        table: &TableSpec,
        id: &StorageId,
        row: &Value,
        if_match: Option<&str>,
    ) -> Result<StoredRow, StorageError> {
        let started = Instant::now();
        let result = self.inner.update_by_id(table, id, row, if_match).await;
        self.observe("update_by_id", table, started, &result);
        result
    }

    async fn list_keys(&self, table: &TableSpec) -> Result<Vec<String>, StorageError> {
        let started = Instant::now();
        let result = self.inner.list_keys(table).await;
        self.observe("list_keys", table, started, &result);
        result
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}

impl<S: RecordStore> std::fmt::Debug for InstrumentedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentedStore")
            .field("backend", &self.inner.backend_name())
            .finish()
    }
}
