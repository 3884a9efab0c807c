//! Store fakes shared by the reconciler tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use qcforms_core::{
    Answer, FormSchema, ReleaseForm, ReleaseRecord, SheetForm, SheetRecord, TableSpec,
    VolumeForm, VolumeRecord,
};
use qcforms_db_memory::InMemoryStore;
use qcforms_storage::{RecordStore, StorageError, StorageId, StoredRow};
use serde_json::Value;
use tokio::sync::Notify;

/// Per-operation call counts.
#[derive(Debug, Default)]
pub struct Calls {
    pub find_by_key: AtomicUsize,
    pub find_id_by_key: AtomicUsize,
    pub insert: AtomicUsize,
    pub update_by_id: AtomicUsize,
    pub list_keys: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.find_by_key.load(Ordering::SeqCst)
            + self.find_id_by_key.load(Ordering::SeqCst)
            + self.insert.load(Ordering::SeqCst)
            + self.update_by_id.load(Ordering::SeqCst)
            + self.list_keys.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.insert.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.update_by_id.load(Ordering::SeqCst)
    }
}

/// In-memory store that counts every call it forwards.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryStore,
    pub calls: Calls,
}

impl CountingStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn find_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StoredRow>, StorageError> {
        self.calls.find_by_key.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_key(table, key).await
    }

    async fn find_id_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StorageId>, StorageError> {
        self.calls.find_id_by_key.fetch_add(1, Ordering::SeqCst);
        self.inner.find_id_by_key(table, key).await
    }

    async fn insert(&self, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError> {
        self.calls.insert.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(table, row).await
    }

    async fn update_by_id(
        &self,
        table: &TableSpec,
        id: &StorageId,
        row: &Value,
        if_match: Option<&str>,
    ) -> Result<StoredRow, StorageError> {
        self.calls.update_by_id.fetch_add(1, Ordering::SeqCst);
        self.inner.update_by_id(table, id, row, if_match).await
    }

    async fn list_keys(&self, table: &TableSpec) -> Result<Vec<String>, StorageError> {
        self.calls.list_keys.fetch_add(1, Ordering::SeqCst);
        self.inner.list_keys(table).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// Store whose every call fails as if the backend were unreachable.
#[derive(Debug, Default)]
pub struct FailingStore;

fn unreachable_backend() -> StorageError {
    StorageError::connection_error("backend unreachable")
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn find_by_key(&self, _: &TableSpec, _: &str) -> Result<Option<StoredRow>, StorageError> {
        Err(unreachable_backend())
    }

    async fn find_id_by_key(
        &self,
        _: &TableSpec,
        _: &str,
    ) -> Result<Option<StorageId>, StorageError> {
        Err(unreachable_backend())
    }

    async fn insert(&self, _: &TableSpec, _: &Value) -> Result<StoredRow, StorageError> {
        Err(unreachable_backend())
    }

    async fn update_by_id(
        &self,
        _: &TableSpec,
        _: &StorageId,
        _: &Value,
        _: Option<&str>,
    ) -> Result<StoredRow, StorageError> {
        Err(unreachable_backend())
    }

    async fn list_keys(&self, _: &TableSpec) -> Result<Vec<String>, StorageError> {
        Err(unreachable_backend())
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Store whose lookups park until released, to hold an operation in flight.
#[derive(Debug, Default)]
pub struct GatedStore {
    pub inner: InMemoryStore,
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn find_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StoredRow>, StorageError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.find_by_key(table, key).await
    }

    async fn find_id_by_key(
        &self,
        table: &TableSpec,
        key: &str,
    ) -> Result<Option<StorageId>, StorageError> {
        self.inner.find_id_by_key(table, key).await
    }

    async fn insert(&self, table: &TableSpec, row: &Value) -> Result<StoredRow, StorageError> {
        self.inner.insert(table, row).await
    }

    async fn update_by_id(
        &self,
        table: &TableSpec,
        id: &StorageId,
        row: &Value,
        if_match: Option<&str>,
    ) -> Result<StoredRow, StorageError> {
        self.inner.update_by_id(table, id, row, if_match).await
    }

    async fn list_keys(&self, table: &TableSpec) -> Result<Vec<String>, StorageError> {
        self.inner.list_keys(table).await
    }

    fn backend_name(&self) -> &'static str {
        "gated"
    }
}

pub fn release_record(order: &str, lot: &str) -> ReleaseRecord {
    ReleaseRecord {
        production_release_order: order.into(),
        lot_number: lot.into(),
        production_date: "2024-05-01".into(),
        evaluation_date: "2024-05-02".into(),
        ..ReleaseForm::initialize()
    }
}

pub fn volume_record(order: &str, lot: &str) -> VolumeRecord {
    VolumeRecord {
        product_release_order: order.into(),
        date: "2024-07-01".into(),
        product_reference: "VX-10".into(),
        quantity_produced: "500".into(),
        description_of_product: "Vanilla extract".into(),
        lot_number: lot.into(),
        client: "ACME".into(),
        alcohol_content: "35%".into(),
        acceptable_weight_range: "98-102".into(),
        ..VolumeForm::initialize()
    }
}

pub fn sheet_record(order: &str) -> SheetRecord {
    let mut record = SheetRecord {
        product_release_order: order.into(),
        product_reference: "VX-10".into(),
        description_of_product: "Vanilla extract 100ml".into(),
        lot_number: format!("L-{order}"),
        date: "2024-06-01".into(),
        quantity_produced: "500".into(),
        ..SheetForm::initialize()
    };
    record.process_steps.date = "2024-06-01".into();
    record.process_steps.time = "08:00".into();
    record.process_steps.outflow_from_stock = "20kg".into();
    record.process_steps.weigh = "20kg".into();
    record.process_steps.mixing = "ok".into();
    record.process_steps.storekeeper = "Jo".into();
    for item in &mut record.inspection_items {
        item.answer = Answer::No;
    }
    for item in &mut record.control_items {
        item.conform = true;
    }
    record.production_steps[0].person_performing = "Sam".into();
    record
}
