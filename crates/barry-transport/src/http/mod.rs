//! HTTP transports.
//!
//! - `http-client`: [`RestClient`], the REST implementation of
//!   [`InteractionApi`](barry_core::InteractionApi)
//! - `http-server`: [`WebhookServer`], the signed interactions endpoint

#[cfg(feature = "http-client")]
mod client;
#[cfg(feature = "http-client")]
pub use client::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT, RestClient};

#[cfg(feature = "http-server")]
mod multipart;
#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
mod verifier;
#[cfg(feature = "http-server")]
pub use server::{WebhookConfig, WebhookServer};
#[cfg(feature = "http-server")]
pub use verifier::{Verifier, VerifyError};
