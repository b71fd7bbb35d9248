use thiserror::Error;

use fieldlog_remote::RemoteError;
use fieldlog_shared::SyncStatus;
use fieldlog_store::StoreError;

/// Errors surfaced by the data layer.
///
/// Read paths rarely return these: they degrade to empty results and log.
/// The hard failures are reserved for explicit user actions -- submission,
/// capture, profile save -- where the caller must show something.
#[derive(Error, Debug)]
pub enum DataError {
    /// The local storage engine failed; reads degrade, writes are
    /// best-effort, but explicit local writes surface this.
    #[error("Local storage unavailable: {0}")]
    Storage(#[from] StoreError),

    /// The remote store returned an error or was unreachable.
    #[error("Remote query failed: {0}")]
    Remote(#[from] RemoteError),

    /// An operation that structurally requires connectivity was invoked
    /// while offline.
    #[error("Operation requires connectivity")]
    Offline,

    /// The attachment state machine refused a transition.
    #[error("Illegal sync transition: {from} -> {to}")]
    IllegalTransition { from: SyncStatus, to: SyncStatus },

    /// A sync or restore was requested for an unknown photo.
    #[error("Photo not found: {0}")]
    PhotoNotFound(String),

    /// No device identity has been provisioned; profile operations cannot
    /// proceed without one.
    #[error("No device identity available")]
    NoDeviceIdentity,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;
