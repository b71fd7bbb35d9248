//! Store lifecycle management.
//!
//! [`StoreManager`] owns the paths of the two local stores and hands out one
//! shared [`StorePair`] handle.  The open is single-flight: concurrent
//! callers racing before the first open completes all await the same
//! in-flight open, so the schema migration never runs twice.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::database::Database;
use crate::error::Result;
use crate::flags::FlagStore;

/// The opened pair of local stores.
///
/// Both connections are behind short-lived mutexes; callers must release a
/// guard before awaiting anything.
pub struct StorePair {
    pub database: Mutex<Database>,
    pub flags: Mutex<FlagStore>,
}

/// Single-flight opener for the local stores.
pub struct StoreManager {
    db_path: Option<PathBuf>,
    flags_path: Option<PathBuf>,
    cell: OnceCell<Arc<StorePair>>,
}

impl StoreManager {
    /// Manager for the default platform paths.
    pub fn new() -> Self {
        Self {
            db_path: None,
            flags_path: None,
            cell: OnceCell::new(),
        }
    }

    /// Manager for explicit paths (tests, embedded layouts).
    pub fn at(db_path: PathBuf, flags_path: PathBuf) -> Self {
        Self {
            db_path: Some(db_path),
            flags_path: Some(flags_path),
            cell: OnceCell::new(),
        }
    }

    /// Open both stores, or return the already-open handle.
    ///
    /// Idempotent and single-flight: every caller resolves to the same
    /// `Arc<StorePair>`.
    pub async fn open(&self) -> Result<Arc<StorePair>> {
        self.cell
            .get_or_try_init(|| async {
                let database = match &self.db_path {
                    Some(path) => Database::open_at(path)?,
                    None => Database::new()?,
                };
                let flags = match &self.flags_path {
                    Some(path) => FlagStore::open_at(path)?,
                    None => FlagStore::new()?,
                };
                tracing::debug!("local stores open");
                Ok(Arc::new(StorePair {
                    database: Mutex::new(database),
                    flags: Mutex::new(flags),
                }))
            })
            .await
            .cloned()
    }
}

impl Default for StoreManager {
    fn default() -> Self {
        Self::new()
    }
}
