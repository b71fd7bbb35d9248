//! # fieldlog-shared
//!
//! Canonical domain models for the fieldlog data layer, plus the record
//! normalizer that collapses the various wire and cache shapes of each
//! entity into exactly one in-memory representation.
//!
//! Everything here is pure data: no I/O, no storage, no network.

pub mod models;
pub mod normalize;

pub use models::*;
