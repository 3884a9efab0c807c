//! The search, edit, validate and submit flow for one record.

use qcforms_core::{FormSchema, ValidationFailure, normalize_search_key};
use qcforms_storage::{DynRecordStore, StorageError, StorageId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{ReconcileError, Result};

/// Behavior switches for a reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerOptions {
    /// Send the loaded row version with updates and reject stale writes.
    pub optimistic_concurrency: bool,
}

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new row was inserted; the record now carries its identity.
    Created(StorageId),
    /// The row with this identity was replaced.
    Updated(StorageId),
}

impl SubmitOutcome {
    pub fn id(&self) -> &StorageId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }

    /// Success message for the form titled `title`.
    pub fn message(&self, title: &str) -> String {
        match self {
            Self::Created(_) => format!("{title} submitted successfully"),
            Self::Updated(_) => format!("{title} updated successfully"),
        }
    }
}

/// Mediates between one editable record and the store.
///
/// A record is either new (no storage identity) or existing (loaded from,
/// or previously written to, the store). Every failed operation leaves the
/// in-memory state as it was. The held record is always in its
/// [`FormSchema::normalize`]d shape, so what submit writes is what search
/// finds.
pub struct Reconciler<F: FormSchema> {
    store: DynRecordStore,
    options: ReconcilerOptions,
    record: F::Record,
    storage_id: Option<StorageId>,
    version: Option<i64>,
    search_key: String,
}

impl<F: FormSchema> std::fmt::Debug for Reconciler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("form", &F::KIND)
            .field("backend", &self.store.backend_name())
            .field("storage_id", &self.storage_id)
            .field("version", &self.version)
            .field("search_key", &self.search_key)
            .finish_non_exhaustive()
    }
}

impl<F: FormSchema> Reconciler<F> {
    /// Creates a reconciler holding a freshly initialized record.
    pub fn new(store: DynRecordStore) -> Self {
        Self::with_options(store, ReconcilerOptions::default())
    }

    pub fn with_options(store: DynRecordStore, options: ReconcilerOptions) -> Self {
        Self {
            store,
            options,
            record: F::initialize(),
            storage_id: None,
            version: None,
            search_key: String::new(),
        }
    }

    /// Replaces the record with the form's defaults.
    ///
    /// Identity and search key are kept; see [`reset`](Self::reset).
    pub fn initialize(&mut self) {
        self.record = F::initialize();
    }

    pub fn record(&self) -> &F::Record {
        &self.record
    }

    pub fn storage_id(&self) -> Option<&StorageId> {
        self.storage_id.as_ref()
    }

    /// Row version seen at the last load or write.
    pub fn version(&self) -> Option<i64> {
        self.version
    }

    /// Normalized key of the last successful search.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    pub fn is_existing(&self) -> bool {
        self.storage_id.is_some()
    }

    pub fn options(&self) -> ReconcilerOptions {
        self.options
    }

    /// Loads the record with business key `raw` and adopts its identity.
    ///
    /// # Errors
    ///
    /// `EmptyKey` before any store call when the normalized key is empty,
    /// `NotFound` when no row matches, `Store`/`MalformedRow` on remote
    /// failure. The current record is untouched in every error case.
    pub async fn search(&mut self, raw: &str) -> Result<&F::Record> {
        let key = normalize_search_key(raw, F::NUMERIC_KEY);
        if key.is_empty() {
            warn!(form = %F::KIND, "Search rejected: empty key");
            return Err(ReconcileError::EmptyKey { label: F::KEY_LABEL });
        }

        let row = self
            .store
            .find_by_key(&F::TABLE, &key)
            .await
            .map_err(|e| remote_failure(F::KIND.as_str(), "search", e))?;

        let Some(row) = row else {
            warn!(form = %F::KIND, key = %key, "No record found");
            return Err(ReconcileError::NotFound {
                label: F::KEY_LABEL,
                key,
            });
        };

        let record = F::from_row(row.data).map(F::normalize).map_err(|e| {
            error!(form = %F::KIND, key = %key, error = %e, "Stored row is malformed");
            ReconcileError::malformed(e.to_string())
        })?;

        info!(form = %F::KIND, key = %key, id = %row.id, version = row.version, "Record loaded");
        self.record = record;
        self.storage_id = Some(row.id);
        self.version = Some(row.version);
        self.search_key = key;
        Ok(&self.record)
    }

    /// Applies one edit. A rejected edit leaves the record unchanged.
    pub fn mutate(&mut self, edit: F::Edit) -> Result<&F::Record> {
        debug!(form = %F::KIND, ?edit, "Applying edit");
        self.record = F::apply(&self.record, edit)?;
        Ok(&self.record)
    }

    /// Replaces every field at once, keeping identity and version.
    ///
    /// The record is normalized on the way in: the business key takes its
    /// searchable shape and derived fields are recomputed.
    pub fn replace_record(&mut self, record: F::Record) {
        self.record = F::normalize(record);
    }

    pub fn validate(&self) -> Vec<ValidationFailure> {
        F::validate(&self.record)
    }

    /// Validates, then inserts a new record or updates the loaded one.
    ///
    /// # Errors
    ///
    /// `Invalid` without touching the store when validation fails,
    /// `Duplicate` when the business key is taken or the store reports a
    /// unique violation, `Stale` when optimistic concurrency is on and the
    /// row moved on, `Store` for any other store failure.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let failures = self.validate();
        if !failures.is_empty() {
            warn!(form = %F::KIND, count = failures.len(), "Submit rejected by validation");
            return Err(ReconcileError::Invalid(failures));
        }

        let row = F::to_row(&self.record).map_err(|e| ReconcileError::malformed(e.to_string()))?;

        match self.storage_id.clone() {
            None => {
                let key = F::business_key(&self.record);
                let existing = self
                    .store
                    .find_id_by_key(&F::TABLE, key)
                    .await
                    .map_err(|e| remote_failure(F::KIND.as_str(), "existence check", e))?;
                if existing.is_some() {
                    warn!(form = %F::KIND, key = %key, "Business key already taken");
                    return Err(ReconcileError::Duplicate {
                        column: Some(F::TABLE.key_column.to_string()),
                        label: Some(F::KEY_LABEL.to_string()),
                    });
                }

                let stored = self
                    .store
                    .insert(&F::TABLE, &row)
                    .await
                    .map_err(|e| write_failure::<F>("insert", e))?;

                info!(form = %F::KIND, key = %key, id = %stored.id, "Record created");
                self.storage_id = Some(stored.id.clone());
                self.version = Some(stored.version);
                Ok(SubmitOutcome::Created(stored.id))
            }
            Some(id) => {
                let if_match = self
                    .options
                    .optimistic_concurrency
                    .then(|| self.version.map(|v| v.to_string()))
                    .flatten();

                let stored = self
                    .store
                    .update_by_id(&F::TABLE, &id, &row, if_match.as_deref())
                    .await
                    .map_err(|e| write_failure::<F>("update", e))?;

                info!(form = %F::KIND, id = %stored.id, version = stored.version, "Record updated");
                self.version = Some(stored.version);
                Ok(SubmitOutcome::Updated(stored.id))
            }
        }
    }

    /// Discards the record, its identity and the search key.
    pub fn reset(&mut self) {
        debug!(form = %F::KIND, "Resetting form");
        self.initialize();
        self.storage_id = None;
        self.version = None;
        self.search_key.clear();
    }

    /// Resets only when `confirm` agrees. Returns whether it did.
    pub fn reset_if(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if confirm() {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Persisted business keys, sorted, optionally filtered by substring.
    pub async fn list_keys(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let mut keys = self
            .store
            .list_keys(&F::TABLE)
            .await
            .map_err(|e| remote_failure(F::KIND.as_str(), "list keys", e))?;

        if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
            keys.retain(|k| k.contains(filter));
        }
        keys.sort();
        Ok(keys)
    }
}

fn remote_failure(form: &str, operation: &str, err: StorageError) -> ReconcileError {
    error!(form, operation, category = %err.category(), error = %err, "Store operation failed");
    ReconcileError::Store(err)
}

fn write_failure<F: FormSchema>(operation: &str, err: StorageError) -> ReconcileError {
    match err {
        StorageError::UniqueViolation { column, .. } => {
            let label = column
                .as_deref()
                .filter(|c| F::TABLE.is_unique(c))
                .map(|c| F::TABLE.label_for(c).to_string());
            warn!(form = %F::KIND, operation, column = ?column, "Unique constraint rejected write");
            ReconcileError::Duplicate { column, label }
        }
        StorageError::VersionConflict { expected, actual } => {
            warn!(form = %F::KIND, %expected, %actual, "Stale record rejected");
            ReconcileError::Stale
        }
        other => remote_failure(F::KIND.as_str(), operation, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcforms_core::{ReleaseEdit, ReleaseField, ReleaseForm, SampleSlot};
    use qcforms_db_memory::create_record_store;

    #[test]
    fn test_submit_outcome_messages() {
        let id = StorageId::new("abc");
        assert_eq!(
            SubmitOutcome::Created(id.clone()).message("Volume Control"),
            "Volume Control submitted successfully"
        );
        assert_eq!(
            SubmitOutcome::Updated(id.clone()).message("Volume Control"),
            "Volume Control updated successfully"
        );
        assert_eq!(SubmitOutcome::Updated(id.clone()).id(), &id);
    }

    #[test]
    fn test_new_reconciler_is_initialized() {
        let reconciler = Reconciler::<ReleaseForm>::new(create_record_store());
        assert_eq!(reconciler.record(), &ReleaseForm::initialize());
        assert!(!reconciler.is_existing());
        assert_eq!(reconciler.search_key(), "");
        assert!(!reconciler.options().optimistic_concurrency);
    }

    #[test]
    fn test_rejected_edit_keeps_record() {
        let mut reconciler = Reconciler::<ReleaseForm>::new(create_record_store());
        reconciler
            .mutate(ReleaseEdit::Field(ReleaseField::LotNumber, "L-9".into()))
            .unwrap();
        let before = reconciler.record().clone();

        let err = reconciler
            .mutate(ReleaseEdit::Sample {
                row: 42,
                slot: SampleSlot::One,
                value: "1".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Edit(_)));
        assert_eq!(reconciler.record(), &before);
    }

    #[test]
    fn test_reset_if_declined() {
        let mut reconciler = Reconciler::<ReleaseForm>::new(create_record_store());
        reconciler
            .mutate(ReleaseEdit::Field(ReleaseField::LotNumber, "L-9".into()))
            .unwrap();

        assert!(!reconciler.reset_if(|| false));
        assert_eq!(reconciler.record().lot_number, "L-9");

        assert!(reconciler.reset_if(|| true));
        assert_eq!(reconciler.record(), &ReleaseForm::initialize());
    }
}
