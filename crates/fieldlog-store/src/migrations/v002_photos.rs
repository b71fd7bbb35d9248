//! v002 -- Photo attachment queue.
//!
//! Adds the `photos` collection with its two secondary indexes.  Purely
//! additive; v001 collections are untouched.

use rusqlite::Connection;

/// SQL executed when upgrading from version 1 to version 2.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id                TEXT PRIMARY KEY NOT NULL,
    report_id         TEXT NOT NULL,
    payload           BLOB NOT NULL,        -- compressed image bytes
    caption           TEXT NOT NULL DEFAULT '',
    taken_at          TEXT NOT NULL,        -- ISO-8601 / RFC-3339
    gps               TEXT,                 -- {"lat":..,"lng":..} or NULL
    sync_status       TEXT NOT NULL DEFAULT 'pending',
    retry_count       INTEGER NOT NULL DEFAULT 0,
    last_sync_attempt TEXT,
    remote_id         TEXT,                 -- set after successful upload
    storage_path      TEXT                  -- set after successful upload
);

CREATE INDEX IF NOT EXISTS idx_photos_report_id   ON photos(report_id);
CREATE INDEX IF NOT EXISTS idx_photos_sync_status ON photos(sync_status);
"#;

/// Apply the photos migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
