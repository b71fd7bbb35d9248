//! Photo capture and the attachment sync queue.
//!
//! Every photo record carries its own queue bookkeeping: the sync status,
//! the retry counter and the last-attempt stamp.  This module is the only
//! writer of those fields, and every status change goes through the legal
//! transition table on [`SyncStatus`] -- an illegal move is a bug surfaced
//! as [`DataError::IllegalTransition`], never silently applied.
//!
//! The background retry sweep itself lives with the host; this module
//! exposes the by-status query surface and the per-photo attempt it needs.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fieldlog_remote::rows::PhotoUpload;
use fieldlog_shared::{GpsPoint, Photo, SyncStatus};

use crate::error::{DataError, Result};
use crate::DataLayer;

/// What the capture flow hands in.  Everything queue-related is stamped
/// here, not by the caller.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    /// Pre-minted id, if the caller has one; otherwise a fresh `photo_*` id
    /// is generated.
    pub id: Option<String>,
    pub report_id: String,
    pub payload: Bytes,
    pub caption: String,
    pub taken_at: Option<DateTime<Utc>>,
    pub gps: Option<GpsPoint>,
}

/// Tally of one sync sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSweep {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
}

impl DataLayer {
    /// Store a freshly captured photo: `pending`, zero retries, no remote
    /// identifiers yet.
    pub fn save_photo(&self, new: NewPhoto) -> Result<Photo> {
        let photo = Photo {
            id: new
                .id
                .unwrap_or_else(|| format!("photo_{}", Uuid::new_v4().simple())),
            report_id: new.report_id,
            payload: new.payload,
            caption: new.caption,
            taken_at: new.taken_at.unwrap_or_else(Utc::now),
            gps: new.gps,
            sync_status: SyncStatus::Pending,
            retry_count: 0,
            last_sync_attempt: None,
            remote_id: None,
            storage_path: None,
        };

        self.with_db(|db| db.upsert_photo(&photo))?;
        tracing::debug!(photo_id = %photo.id, report_id = %photo.report_id, "photo captured");
        Ok(photo)
    }

    /// All photos for a report.  Degrades to empty on storage failure.
    pub fn get_photos(&self, report_id: &str) -> Vec<Photo> {
        match self.with_db(|db| db.photos_for_report(report_id)) {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!(report_id, error = %e, "photo read failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// All photos in one lifecycle stage -- the query surface a background
    /// reconciliation sweep drives.  Degrades to empty on storage failure.
    pub fn photos_with_status(&self, status: SyncStatus) -> Vec<Photo> {
        match self.with_db(|db| db.photos_with_status(status)) {
            Ok(photos) => photos,
            Err(e) => {
                tracing::warn!(status = %status, error = %e, "photo status read failed");
                Vec::new()
            }
        }
    }

    /// Update the caption of a stored photo.  The queue fields are left
    /// untouched.
    pub fn update_photo_caption(&self, photo_id: &str, caption: &str) -> Result<Photo> {
        let mut photo = self
            .with_db(|db| db.get_photo(photo_id))?
            .ok_or_else(|| DataError::PhotoNotFound(photo_id.to_string()))?;
        photo.caption = caption.to_string();
        self.with_db(|db| db.upsert_photo(&photo))?;
        Ok(photo)
    }

    /// Remove a photo before submission.
    ///
    /// A record that never reached the remote store is deleted outright.  A
    /// record with a remote id becomes a `pending-delete` tombstone so the
    /// external cleanup sweep knows a remote artifact is still owed.
    pub fn delete_photo(&self, photo_id: &str) -> Result<()> {
        let photo = match self.with_db(|db| db.get_photo(photo_id)) {
            Ok(Some(photo)) => photo,
            Ok(None) => return Ok(()),
            Err(e) => {
                tracing::warn!(photo_id, error = %e, "photo delete lookup failed");
                return Ok(());
            }
        };

        if photo.remote_id.is_none() {
            if let Err(e) = self.with_db(|db| db.delete_photo(photo_id).map(|_| ())) {
                tracing::warn!(photo_id, error = %e, "photo delete failed");
            } else {
                tracing::debug!(photo_id, "photo deleted");
            }
            return Ok(());
        }

        let mut tombstone = photo;
        transition(&mut tombstone, SyncStatus::PendingDelete)?;
        self.with_db(|db| db.upsert_photo(&tombstone))?;
        tracing::info!(photo_id, "photo marked for remote deletion");
        Ok(())
    }

    /// Undo a pending deletion, returning the record to the upload queue.
    pub fn restore_photo(&self, photo_id: &str) -> Result<Photo> {
        let mut photo = self
            .with_db(|db| db.get_photo(photo_id))?
            .ok_or_else(|| DataError::PhotoNotFound(photo_id.to_string()))?;
        transition(&mut photo, SyncStatus::Pending)?;
        self.with_db(|db| db.upsert_photo(&photo))?;
        tracing::debug!(photo_id, "photo restored to pending");
        Ok(photo)
    }

    /// Remove a photo record outright, whatever its state.
    ///
    /// For the cleanup paths that have already settled the remote side:
    /// submission cleanup, and the external sweep after it purges a
    /// tombstone's remote artifact.
    pub fn purge_photo(&self, photo_id: &str) -> Result<()> {
        self.with_db(|db| db.delete_photo(photo_id).map(|_| ()))?;
        tracing::debug!(photo_id, "photo purged");
        Ok(())
    }

    /// Drive one upload attempt for a `pending` or `failed` photo.
    ///
    /// Success stamps the remote id and storage path; failure is recorded
    /// on the record (status, retry counter, attempt stamp) and NOT raised
    /// -- the returned photo tells the caller what happened.
    pub async fn sync_photo(&self, photo_id: &str) -> Result<Photo> {
        let mut photo = self
            .with_db(|db| db.get_photo(photo_id))?
            .ok_or_else(|| DataError::PhotoNotFound(photo_id.to_string()))?;

        if !matches!(photo.sync_status, SyncStatus::Pending | SyncStatus::Failed) {
            return Err(DataError::IllegalTransition {
                from: photo.sync_status,
                to: SyncStatus::Synced,
            });
        }
        if !self.is_online() {
            return Err(DataError::Offline);
        }

        let upload = PhotoUpload {
            report_id: photo.report_id.clone(),
            caption: photo.caption.clone(),
            taken_at: photo.taken_at,
            gps: photo.gps,
            payload: photo.payload.clone(),
        };

        match self.remote().upload_photo(&upload).await {
            Ok(stored) => {
                transition(&mut photo, SyncStatus::Synced)?;
                photo.remote_id = Some(stored.id);
                photo.storage_path = stored.storage_path;
                self.with_db(|db| db.upsert_photo(&photo))?;
                tracing::info!(photo_id, "photo synced");
            }
            Err(e) => {
                tracing::warn!(photo_id, error = %e, "photo sync attempt failed");
                transition(&mut photo, SyncStatus::Failed)?;
                photo.retry_count += 1;
                photo.last_sync_attempt = Some(Utc::now());
                self.with_db(|db| db.upsert_photo(&photo))?;
            }
        }

        Ok(photo)
    }

    /// Attempt every `pending` and `failed` photo once, sequentially.
    pub async fn sync_pending_photos(&self) -> Result<SyncSweep> {
        if !self.is_online() {
            tracing::debug!("offline, skipping photo sync sweep");
            return Ok(SyncSweep::default());
        }

        let mut queue = self.photos_with_status(SyncStatus::Pending);
        queue.extend(self.photos_with_status(SyncStatus::Failed));

        let mut sweep = SyncSweep {
            attempted: queue.len(),
            ..SyncSweep::default()
        };
        for photo in queue {
            match self.sync_photo(&photo.id).await {
                Ok(after) if after.sync_status == SyncStatus::Synced => sweep.synced += 1,
                Ok(_) => sweep.failed += 1,
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "sweep attempt errored");
                    sweep.failed += 1;
                }
            }
        }

        tracing::info!(
            attempted = sweep.attempted,
            synced = sweep.synced,
            failed = sweep.failed,
            "photo sync sweep finished"
        );
        Ok(sweep)
    }
}

fn transition(photo: &mut Photo, next: SyncStatus) -> Result<()> {
    if !photo.sync_status.can_become(next) {
        return Err(DataError::IllegalTransition {
            from: photo.sync_status,
            to: next,
        });
    }
    photo.sync_status = next;
    Ok(())
}
