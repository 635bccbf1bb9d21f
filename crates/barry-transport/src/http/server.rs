//! Signed interactions endpoint.
//!
//! Discord POSTs each interaction to one configured path. A request is
//! handled as follows:
//!
//! 1. Verify the Ed25519 signature, else `401`.
//! 2. Reject bodies that are not interactions with `400`.
//! 3. Answer pings with `{"type": 1}`.
//! 4. Hand the interaction to the receiver and wait for its initial
//!    response, which becomes the HTTP response body. Without one before
//!    the timeout the request is answered `202` and later responses go
//!    through REST.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use barry_core::model::{InteractionResponse, is_interaction_shaped};
use barry_core::{BoxedInteractionReceiver, InitialResponder, ListenerHandle};
use serde_json::{Value, json};
use tracing::{debug, error, info, trace, warn};

use super::multipart;
use super::verifier::Verifier;
use crate::error::{TransportError, TransportResult};

const SIGNATURE_HEADER: &str = "x-signature-ed25519";
const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Settings of a [`WebhookServer`].
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Address to bind, e.g. `0.0.0.0:8080`.
    pub addr: String,
    /// Path interactions are POSTed to.
    pub path: String,
    /// Application public key as hex.
    pub public_key: String,
    /// How long to wait for an inline initial response.
    pub response_timeout: Duration,
}

impl WebhookConfig {
    pub fn new(addr: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            path: "/interactions".into(),
            public_key: public_key.into(),
            response_timeout: Duration::from_millis(2500),
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

/// HTTP server delivering interactions to an
/// [`InteractionReceiver`](barry_core::InteractionReceiver).
#[derive(Debug, Clone)]
pub struct WebhookServer {
    config: WebhookConfig,
}

struct ServerState {
    receiver: BoxedInteractionReceiver,
    verifier: Verifier,
    response_timeout: Duration,
}

impl WebhookServer {
    pub fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    /// Binds the configured address and serves until the returned handle is
    /// stopped or dropped.
    pub async fn listen(&self, receiver: BoxedInteractionReceiver) -> TransportResult<ListenerHandle> {
        let verifier = Verifier::from_hex(&self.config.public_key)?;
        let state = Arc::new(ServerState {
            receiver,
            verifier,
            response_timeout: self.config.response_timeout,
        });

        let path = if self.config.path.starts_with('/') {
            self.config.path.clone()
        } else {
            format!("/{}", self.config.path)
        };

        let router = Router::new()
            .route(&path, post(interactions_handler))
            .with_state(state);

        let bind_err = |source| TransportError::Bind {
            addr: self.config.addr.clone(),
            source,
        };
        let listener = tokio::net::TcpListener::bind(&self.config.addr)
            .await
            .map_err(bind_err)?;
        let actual_addr = listener.local_addr().map_err(bind_err)?;

        info!(addr = %actual_addr, path = %path, "Interactions endpoint listening");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Interactions endpoint shutting down");
            });
            if let Err(e) = server.await {
                error!(error = %e, "Interactions endpoint error");
            }
        });

        Ok(ListenerHandle::new(actual_addr.to_string(), shutdown_tx))
    }
}

async fn interactions_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp)) = (
        header_value(SIGNATURE_HEADER),
        header_value(TIMESTAMP_HEADER),
    ) else {
        debug!("Rejecting request without signature headers");
        return (StatusCode::UNAUTHORIZED, "missing request signature").into_response();
    };
    if let Err(e) = state.verifier.verify(signature, timestamp, &body) {
        debug!(error = %e, "Rejecting request with bad signature");
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) if is_interaction_shaped(&payload) => payload,
        _ => return (StatusCode::BAD_REQUEST, "not an interaction").into_response(),
    };

    if payload["type"].as_u64() == Some(1) {
        trace!("Answering ping");
        return Json(json!({ "type": 1 })).into_response();
    }

    let (responder, mut rx) = InitialResponder::channel();
    if let Err(e) = state.receiver.receive_interaction(payload, responder).await {
        warn!(error = %e, "Rejecting undecodable interaction");
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    let outcome = tokio::time::timeout(state.response_timeout, &mut rx).await;
    match outcome {
        Ok(Ok(response)) => encode_response(response),
        Ok(Err(_)) => {
            debug!("Interaction released without an initial response");
            StatusCode::ACCEPTED.into_response()
        }
        Err(_) => {
            // Late responses either landed just now or fall back to REST.
            rx.close();
            match rx.try_recv() {
                Ok(response) => encode_response(response),
                Err(_) => {
                    debug!(timeout = ?state.response_timeout, "No initial response in time");
                    StatusCode::ACCEPTED.into_response()
                }
            }
        }
    }
}

fn encode_response(response: InteractionResponse) -> Response {
    if response.files.is_empty() {
        return Json(response.body()).into_response();
    }
    let (content_type, body) = multipart::encode(&response.body(), &response.files);
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
