//! The store contract every backend implements.

use async_trait::async_trait;
use qcforms_core::TableSpec;
use serde_json::Value;

use crate::error::StorageError;
use crate::types::{StorageId, StoredRow};

/// One logical table per record variant, addressed by business key or by
/// storage identity.
///
/// Implementations must be thread-safe (`Send + Sync`). Each write is a
/// single atomic operation; there are no partial writes.
///
/// # Example
///
/// ```ignore
/// use qcforms_storage::{RecordStore, StorageError, StoredRow};
///
/// async fn load(store: &dyn RecordStore, key: &str) -> Result<StoredRow, StorageError> {
///     store
///         .find_by_key(&ReleaseForm::TABLE, key)
///         .await?
///         .ok_or_else(|| StorageError::not_found(ReleaseForm::TABLE.name, key))
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Finds the row whose business key equals `key`.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing rows.
    async fn find_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StoredRow>, StorageError>;

    /// Existence check: same filter as [`find_by_key`](Self::find_by_key),
    /// projecting only the storage identity.
    async fn find_id_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StorageId>, StorageError>;

    /// Writes a full row and returns it with its assigned identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UniqueViolation` when the business key or a
    /// secondary unique column collides with an existing row.
    /// Returns `StorageError::InvalidRow` if the row is not a JSON object.
    async fn insert(&self, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError>;

    /// Replaces the row matched by `id`.
    ///
    /// If `if_match` is provided, the update only succeeds when the current
    /// version equals it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no row has this identity.
    /// Returns `StorageError::VersionConflict` if `if_match` does not match.
    /// Returns `StorageError::UniqueViolation` on a unique column collision.
    async fn update_by_id(
        &self,
        table: &TableSpec,
        id: &StorageId,
        row: &Value,
        if_match: Option<&str>,
    ) -> Result<StoredRow, StorageError>;

    /// Every business key in the table, in no particular order.
    async fn list_keys(&self, table: &TableSpec) -> Result<Vec<String>, StorageError>;

    /// Name of the storage backend, used in logs.
    fn backend_name(&self) -> &'static str;
}
