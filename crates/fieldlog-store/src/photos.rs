//! CRUD operations for the `photos` collection.
//!
//! Photos carry their sync-queue bookkeeping (status, retry counter, remote
//! identifiers) alongside the image payload.  Both secondary indexes --
//! owning report and sync status -- are exercised here; the sync queue in
//! `fieldlog-data` drives the actual state transitions.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rusqlite::params;

use fieldlog_shared::{GpsPoint, Photo, SyncStatus};

use crate::database::Database;
use crate::error::Result;
use crate::projects::none_on_no_rows;

const PHOTO_COLUMNS: &str = "id, report_id, payload, caption, taken_at, gps, sync_status, \
                             retry_count, last_sync_attempt, remote_id, storage_path";

impl Database {
    /// Upsert a photo record by id, replacing the full record.
    pub fn upsert_photo(&self, photo: &Photo) -> Result<()> {
        let gps = photo.gps.as_ref().map(serde_json::to_string).transpose()?;
        self.conn().execute(
            &format!("INSERT OR REPLACE INTO photos ({PHOTO_COLUMNS}) \
                      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
            params![
                photo.id,
                photo.report_id,
                photo.payload.as_ref(),
                photo.caption,
                photo.taken_at.to_rfc3339(),
                gps,
                photo.sync_status.as_str(),
                photo.retry_count,
                photo.last_sync_attempt.map(|dt| dt.to_rfc3339()),
                photo.remote_id,
                photo.storage_path,
            ],
        )?;
        Ok(())
    }

    /// Fetch a single photo, or `None` if absent.
    pub fn get_photo(&self, id: &str) -> Result<Option<Photo>> {
        self.conn()
            .query_row(
                &format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?1"),
                params![id],
                row_to_photo,
            )
            .map(Some)
            .or_else(none_on_no_rows)
            .map_err(Into::into)
    }

    /// All photos belonging to a report, oldest first.
    pub fn photos_for_report(&self, report_id: &str) -> Result<Vec<Photo>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE report_id = ?1 ORDER BY taken_at ASC"
        ))?;
        let rows = stmt.query_map(params![report_id], row_to_photo)?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        Ok(photos)
    }

    /// All photos currently in the given sync status, stalest attempt first.
    pub fn photos_with_status(&self, status: SyncStatus) -> Result<Vec<Photo>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE sync_status = ?1 \
             ORDER BY COALESCE(last_sync_attempt, '') ASC"
        ))?;
        let rows = stmt.query_map(params![status.as_str()], row_to_photo)?;

        let mut photos = Vec::new();
        for row in rows {
            photos.push(row?);
        }
        Ok(photos)
    }

    /// Delete a photo record.  Returns `true` if a row was deleted; deleting
    /// an absent key is a no-op, not an error.
    pub fn delete_photo(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM photos WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

fn row_to_photo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
    let payload: Vec<u8> = row.get(2)?;
    let taken_str: String = row.get(4)?;
    let gps_str: Option<String> = row.get(5)?;
    let status_str: String = row.get(6)?;
    let attempt_str: Option<String> = row.get(8)?;

    let taken_at = parse_rfc3339(&taken_str, 4)?;
    let last_sync_attempt = attempt_str.map(|s| parse_rfc3339(&s, 8)).transpose()?;

    let gps: Option<GpsPoint> = gps_str
        .map(|s| {
            serde_json::from_str(&s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;

    let sync_status = SyncStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown sync status: {status_str}").into(),
        )
    })?;

    Ok(Photo {
        id: row.get(0)?,
        report_id: row.get(1)?,
        payload: Bytes::from(payload),
        caption: row.get(3)?,
        taken_at,
        gps,
        sync_status,
        retry_count: row.get(7)?,
        last_sync_attempt,
        remote_id: row.get(9)?,
        storage_path: row.get(10)?,
    })
}

fn parse_rfc3339(s: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
