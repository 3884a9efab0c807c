//! Search, edit, validate and submit flows against fake and in-memory stores.

mod common;

use std::sync::Arc;

use common::{CountingStore, FailingStore, release_record, sheet_record, volume_record};
use qcforms_core::{
    FormSchema, ReleaseEdit, ReleaseField, ReleaseForm, SampleRow, SampleSlot, SheetField,
    SheetForm, VolumeEdit, VolumeField, VolumeForm, has_message,
};
use qcforms_db_memory::InMemoryStore;
use qcforms_reconciler::{
    ErrorCategory, ReconcileError, Reconciler, ReconcilerOptions, SubmitOutcome,
};
use qcforms_storage::DynRecordStore;

fn memory() -> DynRecordStore {
    Arc::new(InMemoryStore::new())
}

async fn seed_release(store: &DynRecordStore, order: &str, lot: &str) {
    let row = ReleaseForm::to_row(&release_record(order, lot)).unwrap();
    store.insert(&ReleaseForm::TABLE, &row).await.unwrap();
}

#[tokio::test]
async fn test_search_unknown_key_leaves_state_untouched() {
    let store = CountingStore::shared();
    let mut form = Reconciler::<ReleaseForm>::new(store.clone());
    form.mutate(ReleaseEdit::Field(ReleaseField::LotNumber, "L-5".into()))
        .unwrap();
    let before = form.record().clone();

    for key in ["1", "424242", "0000000001"] {
        let err = form.search(key).await.unwrap_err();
        assert!(matches!(err, ReconcileError::NotFound { .. }));
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(form.record(), &before);
        assert!(!form.is_existing());
    }
    assert_eq!(store.calls.total(), 3);
}

#[tokio::test]
async fn test_empty_key_rejected_before_store_call() {
    let store = CountingStore::shared();
    let mut release = Reconciler::<ReleaseForm>::new(store.clone());
    let mut volume = Reconciler::<VolumeForm>::new(store.clone());

    let err = release.search("  PRO-  ").await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a Production Release Order ID");
    assert_eq!(err.category(), ErrorCategory::Input);

    assert!(matches!(
        volume.search("   ").await,
        Err(ReconcileError::EmptyKey { .. })
    ));
    assert_eq!(store.calls.total(), 0);
}

#[tokio::test]
async fn test_search_loads_record_and_identity() {
    let store = memory();
    seed_release(&store, "1001", "L-1").await;

    let mut form = Reconciler::<ReleaseForm>::new(store);
    let loaded = form.search(" 10-01 ").await.unwrap().clone();

    assert_eq!(loaded, release_record("1001", "L-1"));
    assert!(form.is_existing());
    assert_eq!(form.version(), Some(1));
    assert_eq!(form.search_key(), "1001");
}

#[tokio::test]
async fn test_store_failure_surfaces_and_keeps_state() {
    let mut form = Reconciler::<VolumeForm>::new(Arc::new(FailingStore));
    form.replace_record(volume_record("VC-1", "LOT-1"));
    let before = form.record().clone();

    let err = form.search("VC-1").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Remote);
    assert_eq!(err.to_string(), "Connection error: backend unreachable");
    assert_eq!(form.record(), &before);

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, ReconcileError::Store(_)));
    assert!(!form.is_existing());
    assert_eq!(form.record(), &before);

    assert!(form.list_keys(None).await.is_err());
}

#[tokio::test]
async fn test_invalid_record_never_reaches_store() {
    let store = CountingStore::shared();
    let mut form = Reconciler::<SheetForm>::new(store.clone());
    form.replace_record(sheet_record("2001"));
    form.mutate(qcforms_core::SheetEdit::Field(SheetField::LotNumber, String::new()))
        .unwrap();

    let err = form.submit().await.unwrap_err();
    assert!(has_message(err.failures(), "Lot Number is required"));
    assert_eq!(err.category(), ErrorCategory::Input);
    assert_eq!(store.calls.total(), 0);

    let mut empty = Reconciler::<ReleaseForm>::new(store.clone());
    assert!(!empty.validate().is_empty());
    assert!(empty.submit().await.is_err());
    assert_eq!(store.calls.total(), 0);
}

#[tokio::test]
async fn test_submit_new_record_inserts_and_adopts_identity() {
    let store = CountingStore::shared();
    let mut form = Reconciler::<VolumeForm>::new(store.clone());
    form.replace_record(volume_record("VC-1", "LOT-1"));

    let outcome = form.submit().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Created(_)));
    assert_eq!(form.storage_id(), Some(outcome.id()));
    assert_eq!(
        outcome.message(VolumeForm::KIND.title()),
        "Volume Control submitted successfully"
    );
    assert_eq!(store.calls.inserts(), 1);

    // State is not cleared by a successful submit.
    assert_eq!(form.record(), &volume_record("VC-1", "LOT-1"));
}

#[tokio::test]
async fn test_duplicate_business_key_issues_no_insert() {
    let store = CountingStore::shared();
    let dyn_store: DynRecordStore = store.clone();
    seed_release(&dyn_store, "1001", "L-1").await;
    let inserts_before = store.calls.inserts();

    let mut form = Reconciler::<ReleaseForm>::new(store.clone());
    form.replace_record(release_record("1001", "L-other"));

    let err = form.submit().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "A record with this Production Release Order already exists"
    );
    assert_eq!(err.category(), ErrorCategory::Duplicate);
    assert_eq!(store.calls.inserts(), inserts_before);
    assert!(!form.is_existing());
}

#[tokio::test]
async fn test_secondary_unique_violation_names_column() {
    let store = memory();
    seed_release(&store, "1001", "L-1").await;

    let mut form = Reconciler::<ReleaseForm>::new(store);
    form.replace_record(release_record("1002", "L-1"));

    match form.submit().await.unwrap_err() {
        ReconcileError::Duplicate { column, label } => {
            assert_eq!(column.as_deref(), Some("lot_number"));
            assert_eq!(label.as_deref(), Some("Lot Number"));
        }
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert!(!form.is_existing());
}

#[tokio::test]
async fn test_held_identity_always_updates() {
    let store = CountingStore::shared();
    let mut form = Reconciler::<VolumeForm>::new(store.clone());
    form.replace_record(volume_record("VC-1", "LOT-1"));
    form.submit().await.unwrap();

    form.mutate(VolumeEdit::Field(VolumeField::Client, "Globex".into()))
        .unwrap();
    let outcome = form.submit().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Updated(_)));

    // Even a changed business key keeps targeting the same row.
    form.mutate(VolumeEdit::Field(VolumeField::ProductReleaseOrder, "VC-9".into()))
        .unwrap();
    form.submit().await.unwrap();

    assert_eq!(store.calls.inserts(), 1);
    assert_eq!(store.calls.updates(), 2);
    assert_eq!(form.version(), Some(3));

    let keys = form.list_keys(None).await.unwrap();
    assert_eq!(keys, vec!["VC-9".to_string()]);
}

#[tokio::test]
async fn test_search_then_update_round_trip() {
    let store = memory();
    seed_release(&store, "1001", "L-1").await;

    let mut form = Reconciler::<ReleaseForm>::new(store.clone());
    form.search("1001").await.unwrap();
    for (slot, value) in SampleSlot::ALL.into_iter().zip(["108", "108", "110", "110"]) {
        form.mutate(ReleaseEdit::Sample {
            row: 2,
            slot,
            value: value.into(),
        })
        .unwrap();
    }
    assert_eq!(form.record().samples[2].average, "109.00");
    form.submit().await.unwrap();

    let mut other = Reconciler::<ReleaseForm>::new(store);
    let loaded = other.search("1001").await.unwrap();
    assert_eq!(loaded.samples[2].average, "109.00");
    assert_eq!(loaded.samples[2].sample4, "110");
}

#[tokio::test]
async fn test_stale_update_rejected_with_optimistic_concurrency() {
    let store = memory();
    seed_release(&store, "1001", "L-1").await;
    let options = ReconcilerOptions {
        optimistic_concurrency: true,
    };

    let mut first = Reconciler::<ReleaseForm>::with_options(store.clone(), options);
    let mut second = Reconciler::<ReleaseForm>::with_options(store.clone(), options);
    first.search("1001").await.unwrap();
    second.search("1001").await.unwrap();

    first
        .mutate(ReleaseEdit::Field(ReleaseField::ProductCode, "A".into()))
        .unwrap();
    first.submit().await.unwrap();

    second
        .mutate(ReleaseEdit::Field(ReleaseField::ProductCode, "B".into()))
        .unwrap();
    let err = second.submit().await.unwrap_err();
    assert!(matches!(err, ReconcileError::Stale));
    assert_eq!(err.category(), ErrorCategory::Conflict);

    // Reloading picks up the new version and the write goes through.
    second.search("1001").await.unwrap();
    second
        .mutate(ReleaseEdit::Field(ReleaseField::ProductCode, "B".into()))
        .unwrap();
    second.submit().await.unwrap();
    assert_eq!(second.version(), Some(3));
}

#[tokio::test]
async fn test_last_writer_wins_by_default() {
    let store = memory();
    seed_release(&store, "1001", "L-1").await;

    let mut first = Reconciler::<ReleaseForm>::new(store.clone());
    let mut second = Reconciler::<ReleaseForm>::new(store.clone());
    first.search("1001").await.unwrap();
    second.search("1001").await.unwrap();

    first.submit().await.unwrap();
    second.submit().await.unwrap();
    assert_eq!(second.version(), Some(3));
}

#[tokio::test]
async fn test_reset_clears_identity_and_key() {
    let store = memory();
    seed_release(&store, "1001", "L-1").await;

    let mut form = Reconciler::<ReleaseForm>::new(store);
    form.search("1001").await.unwrap();
    form.reset();

    assert_eq!(form.record(), &ReleaseForm::initialize());
    assert!(form.storage_id().is_none());
    assert!(form.version().is_none());
    assert_eq!(form.search_key(), "");

    // After reset the same key is new again and collides.
    form.replace_record(release_record("1001", "L-2"));
    assert!(matches!(
        form.submit().await,
        Err(ReconcileError::Duplicate { .. })
    ));
}

#[tokio::test]
async fn test_list_keys_sorted_and_filtered() {
    let store = memory();
    for (order, lot) in [("3003", "L-3"), ("1001", "L-1"), ("2002", "L-2"), ("1100", "L-4")] {
        seed_release(&store, order, lot).await;
    }

    let form = Reconciler::<ReleaseForm>::new(store);
    assert_eq!(
        form.list_keys(None).await.unwrap(),
        vec!["1001", "1100", "2002", "3003"]
    );
    assert_eq!(form.list_keys(Some("10")).await.unwrap(), vec!["1001", "1100"]);
    assert_eq!(form.list_keys(Some("  ")).await.unwrap().len(), 4);
    assert!(form.list_keys(Some("9")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_volume_partial_weight_row_blocks_submit() {
    let store = CountingStore::shared();
    let mut form = Reconciler::<VolumeForm>::new(store.clone());
    form.replace_record(volume_record("VC-1", "LOT-1"));
    form.mutate(VolumeEdit::WeightTime {
        row: 0,
        value: "09:00".into(),
    })
    .unwrap();
    for slot in 0..3 {
        form.mutate(VolumeEdit::Weight {
            row: 0,
            slot,
            value: "10".into(),
        })
        .unwrap();
    }

    let err = form.submit().await.unwrap_err();
    assert!(
        err.failures()
            .iter()
            .any(|f| f.message.contains("All weight values must be filled"))
    );
    assert_eq!(store.calls.total(), 0);
}

#[tokio::test]
async fn test_replaced_record_is_stored_under_searchable_key() {
    let store = memory();
    let mut form = Reconciler::<ReleaseForm>::new(store.clone());
    form.replace_record(release_record("PRO-12", "L-12"));
    assert_eq!(form.record().production_release_order, "12");

    assert!(matches!(form.submit().await.unwrap(), SubmitOutcome::Created(_)));

    let mut other = Reconciler::<ReleaseForm>::new(store);
    let loaded = other.search("PRO-12").await.unwrap();
    assert_eq!(loaded.production_release_order, "12");
    assert_eq!(other.storage_id(), form.storage_id());
}

#[tokio::test]
async fn test_replaced_record_gets_padded_volume_key_trimmed() {
    let store = memory();
    let mut form = Reconciler::<VolumeForm>::new(store.clone());
    form.replace_record(volume_record("  VC-7 ", "LOT-7"));
    form.submit().await.unwrap();

    let mut other = Reconciler::<VolumeForm>::new(store);
    assert_eq!(other.search("VC-7").await.unwrap().product_release_order, "VC-7");
}

#[tokio::test]
async fn test_supplied_average_is_recomputed() {
    let store = memory();
    let mut record = release_record("1003", "L-3");
    record.samples[2] = SampleRow {
        sample1: "108".into(),
        sample2: "108".into(),
        sample3: "110".into(),
        sample4: "110".into(),
        average: "999".into(),
        ..SampleRow::default()
    };
    record.samples[4].average = "7".into();

    let mut form = Reconciler::<ReleaseForm>::new(store.clone());
    form.replace_record(record);
    assert_eq!(form.record().samples[2].average, "109.00");
    assert_eq!(form.record().samples[4].average, "");
    assert!(form.validate().is_empty());
    form.submit().await.unwrap();

    let mut other = Reconciler::<ReleaseForm>::new(store);
    let loaded = other.search("1003").await.unwrap();
    assert_eq!(loaded.samples[2].average, "109.00");
    assert_eq!(loaded.samples[4].average, "");
}

#[tokio::test]
async fn test_stored_row_with_stale_average_is_normalized_on_load() {
    let store = memory();
    let mut row = ReleaseForm::to_row(&release_record("1004", "L-4")).unwrap();
    row["samples"][0] = serde_json::json!({
        "sample1": "4", "sample2": "3", "sample3": "3", "sample4": "3", "average": "1"
    });
    store.insert(&ReleaseForm::TABLE, &row).await.unwrap();

    let mut form = Reconciler::<ReleaseForm>::new(store);
    let loaded = form.search("1004").await.unwrap();
    assert_eq!(loaded.samples[0].average, "3.25");
}
