//! Transport setup errors.
//!
//! Failures of individual API calls are reported as
//! [`ApiError`](barry_core::ApiError); these cover building a transport.

use thiserror::Error;

/// Errors raised while building or starting a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listener could not bind its address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The application public key is not a valid Ed25519 key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Result type for transport setup.
pub type TransportResult<T> = Result<T, TransportError>;
