use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use qcforms_core::TableSpec;
use qcforms_storage::{RecordStore, StorageError, StorageId, StoredRow, text_column};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub type StorageKey = String; // Format: "table/id"

pub(crate) fn make_storage_key(table: &str, id: &StorageId) -> StorageKey {
    format!("{table}/{id}")
}

/// In-memory record store using papaya lock-free HashMap.
///
/// This store provides:
/// - Lock-free concurrent reads via papaya::HashMap
/// - Writes serialized so unique checks and the write are atomic
/// - Unique constraints on every column listed in the table descriptor
/// - Row versions for `if_match` updates
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Rows keyed by `table/id`
    pub(crate) data: Arc<PapayaHashMap<StorageKey, StoredRow>>,
    /// Held for the duration of every write
    write_lock: Mutex<()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored in a table.
    pub fn row_count(&self, table: &TableSpec) -> usize {
        self.rows(table).len()
    }

    fn rows(&self, table: &TableSpec) -> Vec<StoredRow> {
        let prefix = format!("{}/", table.name);
        let guard = self.data.pin();
        guard
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, row)| row.clone())
            .collect()
    }

    fn find(&self, table: &TableSpec, key: &str) -> Option<StoredRow> {
        self.rows(table)
            .into_iter()
            .find(|row| row.text(table.key_column) == Some(key))
    }

    /// First unique column of `row` already taken by a row other than `except`.
    fn collision(
        &self,
        table: &TableSpec,
        row: &Value,
        except: Option<&StorageId>,
    ) -> Option<&'static str> {
        let existing = self.rows(table);
        table.unique_columns.iter().map(|u| u.column).find(|column| {
            let Some(value) = text_column(row, column) else {
                return false;
            };
            existing
                .iter()
                .filter(|other| Some(&other.id) != except)
                .any(|other| other.text(column) == Some(value))
        })
    }
}

fn require_object(row: &Value) -> Result<(), StorageError> {
    if row.is_object() {
        Ok(())
    } else {
        Err(StorageError::invalid_row("row must be a JSON object"))
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StoredRow>, StorageError> {
        Ok(self.find(table, key))
    }

    async fn find_id_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StorageId>, StorageError> {
        Ok(self.find(table, key).map(|row| row.id))
    }

    async fn insert(&self, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError> {
        require_object(row)?;
        let _write = self.write_lock.lock().await;

        if let Some(column) = self.collision(table, row, None) {
            return Err(StorageError::unique_violation(table.name, Some(column.to_string())));
        }

        let stored = StoredRow::new(StorageId::generate(), row.clone());
        self.data
            .pin()
            .insert(make_storage_key(table.name, &stored.id), stored.clone());
        debug!(table = table.name, id = %stored.id, "Inserted row");
        Ok(stored)
    }

    async fn update_by_id(
        &self,
        table: &TableSpec,
        id: &StorageId,
        row: &Value,
        if_match: Option<&str>,
    ) -> Result<StoredRow, StorageError> {
        require_object(row)?;
        let _write = self.write_lock.lock().await;

        let key = make_storage_key(table.name, id);
        let current = self
            .data
            .pin()
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(table.name, id.as_str()))?;

        if let Some(expected) = if_match
            && expected != current.version_tag()
        {
            return Err(StorageError::version_conflict(expected, current.version_tag()));
        }

        if let Some(column) = self.collision(table, row, Some(id)) {
            return Err(StorageError::unique_violation(table.name, Some(column.to_string())));
        }

        let updated = current.next_version(row.clone());
        self.data.pin().insert(key, updated.clone());
        debug!(table = table.name, id = %id, version = updated.version, "Updated row");
        Ok(updated)
    }

    async fn list_keys(&self, table: &TableSpec) -> Result<Vec<String>, StorageError> {
        Ok(self
            .rows(table)
            .iter()
            .filter_map(|row| row.text(table.key_column).map(str::to_string))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
