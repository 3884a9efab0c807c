//! # qcforms-storage
//!
//! Store abstraction for the QC form records.
//!
//! This crate defines the contract the reconciler talks to. It does not
//! contain any backends; those live in `qcforms-db-memory` and
//! `qcforms-db-postgres`.
//!
//! ## Overview
//!
//! [`RecordStore`] covers the four remote calls a form needs:
//! - query by business key
//! - existence check by business key
//! - insert
//! - update by storage identity
//!
//! plus key listing for lookups.

mod error;
pub mod instrumented;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use instrumented::InstrumentedStore;
pub use traits::RecordStore;
pub use types::{StorageId, StoredRow, text_column};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared handle to a store, injected into reconcilers.
pub type DynRecordStore = std::sync::Arc<dyn RecordStore>;

pub mod prelude {
    pub use crate::{
        DynRecordStore, ErrorCategory, RecordStore, StorageError, StorageId, StorageResult,
        StoredRow,
    };
}
