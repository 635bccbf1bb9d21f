//! # Barry Transport
//!
//! Network implementations of the capabilities defined in `barry-core`.
//!
//! ## Features
//!
//! - `http-client`: [`RestClient`], the REST implementation of
//!   [`InteractionApi`](barry_core::InteractionApi)
//! - `http-server`: [`WebhookServer`], the signed interactions endpoint
//!   feeding an [`InteractionReceiver`](barry_core::InteractionReceiver)
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  barry-framework    │  (client pipeline, dispatch)
//! ├─────────────────────┤
//! │  barry-core         │  (InteractionApi, InteractionReceiver)
//! ├─────────────────────┤
//! │  barry-transport    │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (HTTP)     │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use barry_transport::{RestClient, WebhookConfig, WebhookServer};
//!
//! let api = Arc::new(RestClient::new(&token)?);
//! let client = Client::builder(api, application_id).build();
//!
//! let server = WebhookServer::new(WebhookConfig::new("0.0.0.0:8080", public_key));
//! let handle = server.listen(Arc::new(client.clone())).await?;
//! ```

pub mod error;

#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

pub use error::{TransportError, TransportResult};

#[cfg(feature = "http-client")]
pub use http::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT, RestClient};

#[cfg(feature = "http-server")]
pub use http::{Verifier, VerifyError, WebhookConfig, WebhookServer};
