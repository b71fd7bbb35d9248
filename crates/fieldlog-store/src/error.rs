use thiserror::Error;

/// Errors produced by the local stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `clear` was asked for a collection the schema does not declare.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A record handed to `put` is missing its primary key.
    #[error("Record has no usable primary key: {0}")]
    InvalidRecord(String),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Flag values and nested project records round-trip through JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A store mutex was poisoned by a panicking holder.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
