//! Runtime error types.

use barry_framework::{ClientError, CommandError};
use barry_transport::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or running a [`BarryRuntime`](crate::BarryRuntime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A transport could not be built or started.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Command sync failed.
    #[error("Command sync failed: {0}")]
    Command(#[from] CommandError),

    /// No API was supplied and the REST client is not compiled in.
    #[error("No interaction API available; supply one or enable the `http-client` feature")]
    MissingApi,

    /// The webhook server is enabled but not compiled in.
    #[error("Interactions endpoint enabled but the `http-server` feature is off")]
    ServerUnavailable,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
