use thiserror::Error;

/// Errors produced by the remote store client.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport failure: unreachable host, timeout, TLS, etc.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with an error payload.
    #[error("Remote store error {code}: {message}")]
    Api { code: String, message: String },

    /// The response body did not match the expected wire shape.
    #[error("Malformed remote response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RemoteError>;
