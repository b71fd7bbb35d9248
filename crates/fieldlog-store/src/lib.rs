//! # fieldlog-store
//!
//! Local persistence for the fieldlog data layer.
//!
//! Two stores live here.  [`Database`] is the durable object store: a
//! SQLite-backed, schema-versioned set of collections (`projects`,
//! `user_profile`, `photos`) with secondary indexes, surviving process
//! restarts.  [`FlagStore`] is the ephemeral flag store: a separate small
//! key/JSON file for session scalars, drafts and response caches -- all of
//! it disposable.
//!
//! Neither store talks to the network; the tiered resolver in
//! `fieldlog-data` layers the two over the remote source of truth.

pub mod database;
pub mod flags;
pub mod manager;
pub mod migrations;
pub mod photos;
pub mod profile;
pub mod projects;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use flags::{keys, FlagStore};
pub use manager::{StoreManager, StorePair};
