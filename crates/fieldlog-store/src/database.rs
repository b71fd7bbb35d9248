//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees
//! that migrations have run before any other operation.  Opening never drops
//! or rekeys existing records: migrations are strictly additive, so a client
//! upgrading from an older schema keeps everything it had cached.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Collections declared by the current schema.
pub const COLLECTIONS: &[&str] = &["projects", "user_profile", "photos"];

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/fieldlog/fieldlog.db`
    /// - macOS:   `~/Library/Application Support/com.fieldlog.fieldlog/fieldlog.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\fieldlog\fieldlog\data\fieldlog.db`
    pub fn new() -> Result<Self> {
        let db_path = Self::default_path()?;
        tracing::info!(path = %db_path.display(), "opening object store");
        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// Used by tests and by hosts that embed the store in a custom layout.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Default on-disk location of the object store.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "fieldlog", "fieldlog").ok_or(StoreError::NoDataDir)?;
        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("fieldlog.db"))
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers; direct access is for
    /// ad-hoc queries and tests.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Remove every record from a collection.
    ///
    /// Unlike record lookups, naming a collection the schema does not declare
    /// is a caller bug and fails with [`StoreError::UnknownCollection`].
    pub fn clear_collection(&self, name: &str) -> Result<()> {
        if !COLLECTIONS.contains(&name) {
            return Err(StoreError::UnknownCollection(name.to_string()));
        }
        self.conn.execute(&format!("DELETE FROM {name}"), [])?;
        tracing::debug!(collection = name, "cleared collection");
        Ok(())
    }

    /// Per-collection record counts, for diagnostics.
    pub fn collection_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        let mut counts = Vec::with_capacity(COLLECTIONS.len());
        for name in COLLECTIONS {
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {name}"), [], |row| {
                        row.get(0)
                    })?;
            counts.push((*name, count));
        }
        Ok(counts)
    }
}
