//! Capabilities exchanged between the client and its transports.
//!
//! A transport that receives interactions over HTTP hands each verified body
//! to an [`InteractionReceiver`] together with an [`InitialResponder`]. The
//! responder lets the first acknowledgement be written as the HTTP response
//! body instead of a REST callback.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::DecodeError;
use crate::model::InteractionResponse;

// =============================================================================
// Initial Responder
// =============================================================================

/// Single-use slot for an interaction's initial response.
#[derive(Debug)]
pub struct InitialResponder {
    tx: oneshot::Sender<InteractionResponse>,
}

impl InitialResponder {
    /// Creates a responder and the receiving end the transport waits on.
    pub fn channel() -> (Self, oneshot::Receiver<InteractionResponse>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Hands the response to the transport.
    ///
    /// Returns the response back if the transport stopped waiting.
    pub fn send(self, response: InteractionResponse) -> Result<(), InteractionResponse> {
        self.tx.send(response)
    }

    /// Whether the transport is still waiting.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

// =============================================================================
// Interaction Receiver
// =============================================================================

/// Accepts interaction payloads delivered by a transport.
#[async_trait]
pub trait InteractionReceiver: Send + Sync + 'static {
    /// Decodes and dispatches one interaction payload.
    ///
    /// Returns an error if the payload is not an interaction; the transport
    /// maps that to a client error.
    async fn receive_interaction(
        &self,
        payload: Value,
        responder: InitialResponder,
    ) -> Result<(), DecodeError>;
}

/// A shared receiver.
pub type BoxedInteractionReceiver = Arc<dyn InteractionReceiver>;

// =============================================================================
// Listener Handle
// =============================================================================

/// Handle to a running listener.
///
/// Dropping this handle stops the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    /// Address the listener is bound to.
    pub addr: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ListenerHandle {
    pub fn new(addr: impl Into<String>, shutdown_tx: oneshot::Sender<()>) -> Self {
        Self {
            addr: addr.into(),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Stops the listener.
    pub fn stop(mut self) {
        self.signal();
    }

    fn signal(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.signal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responder_delivers_once() {
        let (responder, rx) = InitialResponder::channel();
        assert!(responder.is_open());
        responder.send(InteractionResponse::pong()).unwrap();
        assert_eq!(rx.await.unwrap(), InteractionResponse::pong());
    }

    #[test]
    fn test_responder_returns_response_when_closed() {
        let (responder, rx) = InitialResponder::channel();
        drop(rx);
        assert!(!responder.is_open());
        assert!(responder.send(InteractionResponse::pong()).is_err());
    }

    #[tokio::test]
    async fn test_listener_handle_signals_on_drop() {
        let (tx, rx) = oneshot::channel();
        let handle = ListenerHandle::new("127.0.0.1:0", tx);
        drop(handle);
        assert!(rx.await.is_ok());
    }
}
