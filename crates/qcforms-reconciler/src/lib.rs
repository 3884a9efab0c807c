//! Form record reconciliation.
//!
//! A [`Reconciler`] owns one editable record of a form variant and keeps it
//! in step with an injected [`RecordStore`](qcforms_storage::RecordStore):
//!
//! - `search` loads a record by business key and adopts its storage identity
//! - `mutate` applies one typed edit, recomputing derived fields
//! - `validate` lists what blocks submission
//! - `submit` inserts a new record or updates the loaded one
//! - `reset` returns to the form's defaults
//!
//! The same reconciler serves all three forms; the variant is chosen by the
//! [`FormSchema`](qcforms_core::FormSchema) type parameter.
//!
//! # Example
//!
//! ```ignore
//! use qcforms_core::{ReleaseEdit, ReleaseField, ReleaseForm};
//! use qcforms_reconciler::Reconciler;
//!
//! let mut form = Reconciler::<ReleaseForm>::new(qcforms_db_memory::create_record_store());
//! form.mutate(ReleaseEdit::Field(ReleaseField::LotNumber, "L-1".into()))?;
//! let outcome = form.submit().await?;
//! ```

mod error;
mod reconciler;
mod shared;

pub use error::{ErrorCategory, ReconcileError, Result};
pub use reconciler::{Reconciler, ReconcilerOptions, SubmitOutcome};
pub use shared::SharedReconciler;
