//! Attachment sync queue lifecycle tests.

mod common;

use std::sync::atomic::Ordering;

use bytes::Bytes;

use common::Harness;
use fieldlog_data::{DataError, NewPhoto};
use fieldlog_shared::{GpsPoint, SyncStatus};

fn capture(report_id: &str) -> NewPhoto {
    NewPhoto {
        id: None,
        report_id: report_id.to_string(),
        payload: Bytes::from_static(b"\xFF\xD8fake-jpeg"),
        caption: "north wall".to_string(),
        taken_at: None,
        gps: Some(GpsPoint { lat: 29.95, lng: -90.07 }),
    }
}

#[tokio::test]
async fn capture_starts_pending_with_zero_retries() {
    let h = Harness::online().await;

    let photo = h.data.save_photo(capture("r-1")).unwrap();
    assert!(photo.id.starts_with("photo_"));
    assert_eq!(photo.sync_status, SyncStatus::Pending);
    assert_eq!(photo.retry_count, 0);
    assert_eq!(photo.remote_id, None);
    assert_eq!(photo.storage_path, None);
    assert!(photo.last_sync_attempt.is_none());

    let listed = h.data.get_photos("r-1");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, photo.id);
}

#[tokio::test]
async fn failed_attempt_records_retry_then_success_keeps_counter() {
    let h = Harness::online().await;
    let photo = h.data.save_photo(capture("r-1")).unwrap();

    // First attempt fails: status, counter and stamp all advance.
    h.remote.fail_uploads.store(true, Ordering::SeqCst);
    let after_failure = h.data.sync_photo(&photo.id).await.unwrap();
    assert_eq!(after_failure.sync_status, SyncStatus::Failed);
    assert_eq!(after_failure.retry_count, 1);
    assert!(after_failure.last_sync_attempt.is_some());
    assert_eq!(after_failure.remote_id, None);

    // Second attempt succeeds: remote ids stamped, counter untouched.
    h.remote.fail_uploads.store(false, Ordering::SeqCst);
    let after_success = h.data.sync_photo(&photo.id).await.unwrap();
    assert_eq!(after_success.sync_status, SyncStatus::Synced);
    assert_eq!(after_success.retry_count, 1);
    assert_eq!(after_success.remote_id.as_deref(), Some("remote-photo-1"));
    assert!(after_success.storage_path.is_some());
}

#[tokio::test]
async fn syncing_a_synced_photo_is_refused() {
    let h = Harness::online().await;
    let photo = h.data.save_photo(capture("r-1")).unwrap();
    h.data.sync_photo(&photo.id).await.unwrap();

    match h.data.sync_photo(&photo.id).await {
        Err(DataError::IllegalTransition { from, to }) => {
            assert_eq!(from, SyncStatus::Synced);
            assert_eq!(to, SyncStatus::Synced);
        }
        other => panic!("expected IllegalTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn sweep_attempts_pending_and_failed_photos() {
    let h = Harness::online().await;
    let a = h.data.save_photo(capture("r-1")).unwrap();
    let b = h.data.save_photo(capture("r-1")).unwrap();

    // Put one photo into failed first.
    h.remote.fail_uploads.store(true, Ordering::SeqCst);
    h.data.sync_photo(&a.id).await.unwrap();
    h.remote.fail_uploads.store(false, Ordering::SeqCst);

    let sweep = h.data.sync_pending_photos().await.unwrap();
    assert_eq!(sweep.attempted, 2);
    assert_eq!(sweep.synced, 2);
    assert_eq!(sweep.failed, 0);

    for id in [&a.id, &b.id] {
        let stored = {
            let db = h.stores.database.lock().unwrap();
            db.get_photo(id).unwrap().unwrap()
        };
        assert_eq!(stored.sync_status, SyncStatus::Synced);
    }
}

#[tokio::test]
async fn offline_sweep_is_a_noop() {
    let h = Harness::offline().await;
    h.data.save_photo(capture("r-1")).unwrap();

    let sweep = h.data.sync_pending_photos().await.unwrap();
    assert_eq!(sweep.attempted, 0);

    let photos = h.data.get_photos("r-1");
    assert_eq!(photos[0].sync_status, SyncStatus::Pending);
    assert_eq!(photos[0].retry_count, 0, "offline must not count as an attempt");
}

#[tokio::test]
async fn deleting_an_unsynced_photo_removes_it_outright() {
    let h = Harness::online().await;
    let photo = h.data.save_photo(capture("r-1")).unwrap();

    h.data.delete_photo(&photo.id).unwrap();
    assert!(h.data.get_photos("r-1").is_empty());

    // Deleting again stays a no-op.
    h.data.delete_photo(&photo.id).unwrap();
}

#[tokio::test]
async fn deleting_a_synced_photo_leaves_a_tombstone() {
    let h = Harness::online().await;
    let photo = h.data.save_photo(capture("r-1")).unwrap();
    h.data.sync_photo(&photo.id).await.unwrap();

    h.data.delete_photo(&photo.id).unwrap();

    let tombstones = h.data.photos_with_status(SyncStatus::PendingDelete);
    assert_eq!(tombstones.len(), 1);
    assert_eq!(tombstones[0].id, photo.id);
    assert!(tombstones[0].remote_id.is_some(), "sweep needs the remote id");

    // Once the external sweep settles the remote side, the tombstone goes.
    h.data.purge_photo(&photo.id).unwrap();
    assert!(h.data.photos_with_status(SyncStatus::PendingDelete).is_empty());
}

#[tokio::test]
async fn restore_returns_a_pending_delete_photo_to_the_queue() {
    let h = Harness::online().await;
    let photo = h.data.save_photo(capture("r-1")).unwrap();
    h.data.sync_photo(&photo.id).await.unwrap();
    h.data.delete_photo(&photo.id).unwrap();

    let restored = h.data.restore_photo(&photo.id).unwrap();
    assert_eq!(restored.sync_status, SyncStatus::Pending);

    match h.data.restore_photo("missing") {
        Err(DataError::PhotoNotFound(_)) => {}
        other => panic!("expected PhotoNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn caption_edit_leaves_queue_fields_alone() {
    let h = Harness::online().await;
    let photo = h.data.save_photo(capture("r-1")).unwrap();

    h.remote.fail_uploads.store(true, Ordering::SeqCst);
    h.data.sync_photo(&photo.id).await.unwrap();

    let edited = h.data.update_photo_caption(&photo.id, "south wall").unwrap();
    assert_eq!(edited.caption, "south wall");
    assert_eq!(edited.sync_status, SyncStatus::Failed);
    assert_eq!(edited.retry_count, 1);
}
