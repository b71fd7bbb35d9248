//! v001 -- Initial schema creation.
//!
//! Creates the `projects` and `user_profile` collections.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Projects
-- ----------------------------------------------------------------
-- Schema-on-write: the full record is stored as canonical JSON
-- (contractors nested inside), with the primary key and the owner
-- identity extracted into columns so lookups stay indexed.
CREATE TABLE IF NOT EXISTS projects (
    id      TEXT PRIMARY KEY NOT NULL,
    user_id TEXT NOT NULL DEFAULT '',
    record  TEXT NOT NULL                -- canonical project JSON
);

CREATE INDEX IF NOT EXISTS idx_projects_user_id ON projects(user_id);

-- ----------------------------------------------------------------
-- User profile
-- ----------------------------------------------------------------
-- One row per physical device; the durable id is issued by the
-- remote store and may be NULL until first sync.
CREATE TABLE IF NOT EXISTS user_profile (
    device_id  TEXT PRIMARY KEY NOT NULL,
    id         TEXT,
    full_name  TEXT NOT NULL DEFAULT '',
    title      TEXT NOT NULL DEFAULT '',
    company    TEXT NOT NULL DEFAULT '',
    email      TEXT NOT NULL DEFAULT '',
    phone      TEXT NOT NULL DEFAULT '',
    updated_at TEXT                      -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
