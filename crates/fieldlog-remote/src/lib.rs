//! # fieldlog-remote
//!
//! The remote store seam.  [`client::RemoteStore`] is the narrow async port
//! the data layer consumes; [`http::HttpRemote`] implements it against a
//! PostgREST-style REST backend.  Wire row shapes live in [`rows`] and stay
//! separate from the canonical models -- the normalizer in
//! `fieldlog-shared` is what bridges the two.

pub mod client;
pub mod http;
pub mod rows;

mod error;

pub use client::{Connectivity, NetworkStatus, RemoteStore};
pub use error::{RemoteError, Result};
pub use http::HttpRemote;
