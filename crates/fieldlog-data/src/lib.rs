//! # fieldlog-data
//!
//! The data layer of the fieldlog inspection tool: the single entry point
//! pages use for every read and write.  It resolves entity reads across the
//! local stores and the remote source of truth (local first, remote
//! fallback, cache on read), runs the photo sync queue, and orchestrates
//! final-report submission and cleanup.
//!
//! All collaborators are injected: the opened [`StorePair`], a
//! [`RemoteStore`] implementation and a [`Connectivity`] probe.  Nothing in
//! this crate holds global state.

pub mod ai_cache;
pub mod drafts;
pub mod photos;
pub mod projects;
pub mod settings;
pub mod submit;

mod error;
mod resolver;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use fieldlog_remote::{Connectivity, RemoteStore};
use fieldlog_store::{Database, FlagStore, StoreError, StorePair};

pub use drafts::DraftEntry;
pub use error::{DataError, Result};
pub use photos::{NewPhoto, SyncSweep};
pub use settings::SaveOutcome;
pub use submit::CleanupReport;

/// Facade over the tiered storage engine.
///
/// Cheap to clone the pieces of (everything inside is an `Arc`); hosts
/// typically construct one per process and share it.
pub struct DataLayer {
    stores: Arc<StorePair>,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
}

impl DataLayer {
    pub fn new(
        stores: Arc<StorePair>,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        tracing::debug!("data layer initialized");
        Self {
            stores,
            remote,
            connectivity,
        }
    }

    /// Current connectivity as reported by the platform probe.
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub(crate) fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    /// Run a closure against the object store under a scoped lock.
    ///
    /// The guard never crosses an await: callers do all their local work
    /// inside the closure and release before suspending.
    pub(crate) fn with_db<R>(
        &self,
        f: impl FnOnce(&Database) -> fieldlog_store::Result<R>,
    ) -> Result<R> {
        let guard = self
            .stores
            .database
            .lock()
            .map_err(|_| StoreError::Poisoned)?;
        f(&guard).map_err(DataError::from)
    }

    /// Run a closure against the flag store under a scoped lock.
    pub(crate) fn with_flags<R>(
        &self,
        f: impl FnOnce(&FlagStore) -> fieldlog_store::Result<R>,
    ) -> Result<R> {
        let guard = self.stores.flags.lock().map_err(|_| StoreError::Poisoned)?;
        f(&guard).map_err(DataError::from)
    }

    /// Read a flag, degrading any storage failure to "absent".
    pub(crate) fn flag<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.with_flags(|flags| flags.get(key)) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "flag read failed, treating as absent");
                None
            }
        }
    }

    /// The remote-issued identity reads are scoped by, when known.
    pub(crate) fn user_scope(&self) -> Option<String> {
        self.flag(fieldlog_store::keys::USER_ID)
    }

    /// The stable identifier of this device, issued by the host app.
    pub(crate) fn device_id(&self) -> Option<String> {
        self.flag(fieldlog_store::keys::DEVICE_ID)
    }
}
