//! Unified error types for the Barry core.
//!
//! Framework-level errors (validation, dispatch) live in `barry-framework`.

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors surfaced by the transport collaborator.
///
/// The core never interprets or retries these; they propagate to callers.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Discord JSON error code, when present.
        code: Option<u64>,
        /// Error message.
        message: String,
    },

    /// The request was rate limited.
    #[error("rate limited, retry after {retry_after}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: f64,
    },

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The transport does not support this call.
    #[error("operation not supported by this transport")]
    NotSupported,
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors raised while turning a raw payload into an [`Interaction`].
///
/// [`Interaction`]: crate::interaction::Interaction
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The payload is not valid interaction JSON.
    #[error("invalid interaction payload: {0}")]
    Json(String),

    /// Neither `user` nor `member.user` is present.
    #[error("interaction {id} has no user")]
    MissingUser {
        /// The interaction ID.
        id: String,
    },

    /// A field required by the interaction type is missing.
    #[error("interaction {id} is missing '{field}'")]
    MissingField {
        /// The interaction ID.
        id: String,
        /// Name of the missing field.
        field: &'static str,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

// =============================================================================
// Response Errors
// =============================================================================

/// Errors raised by the response channel of an interaction.
#[derive(Debug, Clone, Error)]
pub enum ResponseError {
    /// An initial response was already sent.
    #[error("You have already acknowledged this interaction.")]
    AlreadyAcknowledged,

    /// Components were awaited before anything could carry them.
    #[error("You must send an initial response before listening for components.")]
    NoInitialResponse,

    /// Transport error.
    #[error(transparent)]
    Api(#[from] ApiError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for response channel operations.
pub type ResponseResult<T> = Result<T, ResponseError>;
