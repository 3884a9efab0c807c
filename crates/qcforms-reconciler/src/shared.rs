//! Single-slot guard serializing operations on one record.

use std::sync::Arc;

use qcforms_core::{FormSchema, ValidationFailure};
use qcforms_storage::DynRecordStore;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::error::{ReconcileError, Result};
use crate::reconciler::{Reconciler, ReconcilerOptions, SubmitOutcome};

/// A [`Reconciler`] that can be shared between tasks.
///
/// Only one operation may hold the record at a time. An operation issued
/// while another is in flight fails with [`ReconcileError::Busy`] instead of
/// queueing behind it.
pub struct SharedReconciler<F: FormSchema> {
    inner: Arc<Mutex<Reconciler<F>>>,
}

impl<F: FormSchema> Clone for SharedReconciler<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: FormSchema> SharedReconciler<F> {
    pub fn new(store: DynRecordStore) -> Self {
        Self::from_reconciler(Reconciler::new(store))
    }

    pub fn with_options(store: DynRecordStore, options: ReconcilerOptions) -> Self {
        Self::from_reconciler(Reconciler::with_options(store, options))
    }

    pub fn from_reconciler(reconciler: Reconciler<F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(reconciler)),
        }
    }

    fn acquire(&self) -> Result<MutexGuard<'_, Reconciler<F>>> {
        self.inner.try_lock().map_err(|_| {
            warn!(form = %F::KIND, "Operation rejected: record busy");
            ReconcileError::Busy
        })
    }

    /// Whether an operation currently holds the record.
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    pub async fn search(&self, raw: &str) -> Result<F::Record> {
        let mut reconciler = self.acquire()?;
        reconciler.search(raw).await.cloned()
    }

    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let mut reconciler = self.acquire()?;
        reconciler.submit().await
    }

    pub fn mutate(&self, edit: F::Edit) -> Result<F::Record> {
        let mut reconciler = self.acquire()?;
        reconciler.mutate(edit).cloned()
    }

    pub fn validate(&self) -> Result<Vec<ValidationFailure>> {
        Ok(self.acquire()?.validate())
    }

    pub fn reset(&self) -> Result<()> {
        self.acquire()?.reset();
        Ok(())
    }

    /// Snapshot of the current record.
    pub fn record(&self) -> Result<F::Record> {
        Ok(self.acquire()?.record().clone())
    }

    /// Runs `f` with exclusive access to the reconciler.
    pub fn with<R>(&self, f: impl FnOnce(&mut Reconciler<F>) -> R) -> Result<R> {
        let mut reconciler = self.acquire()?;
        Ok(f(&mut reconciler))
    }
}
