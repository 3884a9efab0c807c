//! In-memory record store for the QC forms.
//!
//! This crate provides an in-memory implementation of the `RecordStore` trait
//! from `qcforms-storage`, using papaya lock-free HashMap for concurrent access.
//!
//! # Example
//!
//! ```ignore
//! use qcforms_core::{FormSchema, ReleaseForm};
//! use qcforms_db_memory::InMemoryStore;
//! use qcforms_storage::RecordStore;
//!
//! let store = InMemoryStore::new();
//! let row = serde_json::json!({"production_release_order": "1001", "lot_number": "L1"});
//! let stored = store.insert(&ReleaseForm::TABLE, &row).await?;
//! ```

pub mod storage;

pub use qcforms_storage::{RecordStore, StorageError, StoredRow};
pub use storage::{InMemoryStore, StorageKey};

/// Creates a new shareable in-memory store.
pub fn create_record_store() -> qcforms_storage::DynRecordStore {
    std::sync::Arc::new(InMemoryStore::new())
}
