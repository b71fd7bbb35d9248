//! Ephemeral flag store.
//!
//! A small synchronous key/value store for session scalars and small JSON
//! blobs: device identity, active selections, drafts, response caches.
//! Deliberately separate from the object store -- its own file, no schema
//! version, no indexes, no cross-key atomicity -- so the whole thing stays
//! disposable.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::projects::none_on_no_rows;

/// Well-known flag keys.
pub mod keys {
    /// Stable identifier of this physical device (issued by the host app).
    pub const DEVICE_ID: &str = "device_id";
    /// Remote-issued identity of the inspector, captured on first sync.
    pub const USER_ID: &str = "user_id";
    /// Identifier of the currently selected project.
    pub const ACTIVE_PROJECT_ID: &str = "active_project_id";
    /// Map of in-progress drafts keyed by `"{project_id}_{date}"`.
    pub const DRAFTS: &str = "drafts";
    /// Map of memoized generated-text responses keyed by report id.
    pub const AI_CACHE: &str = "ai_cache";
}

/// Synchronous key/JSON store.
pub struct FlagStore {
    conn: Connection,
}

impl FlagStore {
    /// Open (or create) the default flag store, next to the object store.
    pub fn new() -> Result<Self> {
        let path = Self::default_path()?;
        tracing::info!(path = %path.display(), "opening flag store");
        Self::open_at(&path)
    }

    /// Open (or create) a flag store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS flags (
                key   TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Default on-disk location of the flag store.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "fieldlog", "fieldlog").ok_or(StoreError::NoDataDir)?;
        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("flags.db"))
    }

    /// Read a value, or `None` if the key was never set.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM flags WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(none_on_no_rows)?;

        stored
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    /// Overwrite a value unconditionally.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO flags (key, value) VALUES (?1, ?2)",
            params![key, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    /// Remove a key.  Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM flags WHERE key = ?1", params![key])?;
        Ok(())
    }
}
