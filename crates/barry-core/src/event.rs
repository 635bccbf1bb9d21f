//! The client's internal event bus.
//!
//! Every decoded interaction is broadcast as [`ClientEvent::InteractionCreate`];
//! every other gateway dispatch is re-emitted verbatim as
//! [`ClientEvent::Dispatch`]. Short-lived subscriptions (see the await methods
//! on [`ReplyableInteraction`]) observe the same stream as long-lived
//! listeners, in the order events were received.
//!
//! Interactions are also sent on a second channel of their own, so a waiter
//! that only needs interactions is not pushed into lag by dispatch traffic.
//!
//! [`ReplyableInteraction`]: crate::interaction::ReplyableInteraction

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use crate::interaction::Interaction;

/// Gateway dispatch name carrying interactions.
pub const INTERACTION_CREATE: &str = "INTERACTION_CREATE";

/// Default number of events buffered per subscriber.
///
/// A subscriber that falls further behind than this loses the oldest events.
/// Interaction waiters count only interactions against it.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// A raw gateway dispatch (`{t, d}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayDispatch {
    pub t: String,
    #[serde(default)]
    pub d: Value,
}

impl GatewayDispatch {
    pub fn new(t: impl Into<String>, d: Value) -> Self {
        Self { t: t.into(), d }
    }
}

/// An event emitted on the bus.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A decoded interaction, of any type.
    InteractionCreate(Arc<Interaction>),
    /// Any other gateway dispatch, untouched.
    Dispatch { name: Arc<str>, data: Arc<Value> },
}

impl ClientEvent {
    /// The event name listeners key on.
    pub fn name(&self) -> &str {
        match self {
            Self::InteractionCreate(_) => "interactionCreate",
            Self::Dispatch { name, .. } => name,
        }
    }

    /// Returns the interaction, if this is an interaction event.
    pub fn interaction(&self) -> Option<&Arc<Interaction>> {
        match self {
            Self::InteractionCreate(interaction) => Some(interaction),
            Self::Dispatch { .. } => None,
        }
    }
}

struct Channels {
    events: broadcast::Sender<ClientEvent>,
    interactions: broadcast::Sender<Arc<Interaction>>,
}

impl Channels {
    fn subscribe_interactions(&self) -> broadcast::Receiver<Arc<Interaction>> {
        self.interactions.subscribe()
    }
}

/// Process-wide broadcast channel of [`ClientEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        let (interactions, _) = broadcast::channel(capacity);
        Self {
            channels: Arc::new(Channels {
                events,
                interactions,
            }),
        }
    }

    /// Emits an event to every current subscriber.
    ///
    /// Returns the number of subscribers that received it; emitting with no
    /// subscribers is not an error.
    pub fn emit(&self, event: ClientEvent) -> usize {
        let name = event.name().to_string();
        if let ClientEvent::InteractionCreate(interaction) = &event {
            let _ = self.channels.interactions.send(Arc::clone(interaction));
        }
        let delivered = self.channels.events.send(event).unwrap_or(0);
        trace!(event = %name, subscribers = delivered, "Emitted event");
        delivered
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.channels.events.subscribe()
    }

    /// Subscribes to interactions only.
    pub fn subscribe_interactions(&self) -> broadcast::Receiver<Arc<Interaction>> {
        self.channels.subscribe_interactions()
    }

    /// Number of live subscriptions, interaction-only ones included.
    pub fn subscriber_count(&self) -> usize {
        self.channels.events.receiver_count() + self.channels.interactions.receiver_count()
    }

    /// A handle that does not keep the bus alive.
    ///
    /// Interactions hold this form: buffered events own interactions, so a
    /// strong handle inside an interaction would keep the channel alive.
    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            channels: Arc::downgrade(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Non-owning handle to an [`EventBus`].
#[derive(Clone, Default)]
pub struct WeakEventBus {
    channels: Weak<Channels>,
}

impl WeakEventBus {
    /// Subscribes if the bus is still alive.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<ClientEvent>> {
        self.channels.upgrade().map(|c| c.events.subscribe())
    }

    /// Subscribes to interactions only, if the bus is still alive.
    pub fn subscribe_interactions(&self) -> Option<broadcast::Receiver<Arc<Interaction>>> {
        self.channels.upgrade().map(|c| c.subscribe_interactions())
    }
}

impl std::fmt::Debug for WeakEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakEventBus")
            .field("alive", &(self.channels.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dispatch(name: &str) -> ClientEvent {
        ClientEvent::Dispatch {
            name: name.into(),
            data: Arc::new(json!({})),
        }
    }

    #[tokio::test]
    async fn test_emit_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.emit(dispatch("READY")), 0);
    }

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(dispatch("A"));
        bus.emit(dispatch("B"));

        assert_eq!(rx.recv().await.unwrap().name(), "A");
        assert_eq!(rx.recv().await.unwrap().name(), "B");
    }

    #[tokio::test]
    async fn test_interaction_subscription_skips_dispatches() {
        use crate::interaction::test_support::{command_payload, decode};

        let bus = EventBus::new(2);
        let mut rx = bus.subscribe_interactions();

        bus.emit(ClientEvent::InteractionCreate(Arc::new(decode(command_payload("ping", json!([]))))));
        for name in ["A", "B", "C"] {
            bus.emit(dispatch(name));
        }

        assert_eq!(rx.recv().await.unwrap().id(), "1000");
        assert!(rx.try_recv().is_err());
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_weak_handle_does_not_keep_bus_alive() {
        let bus = EventBus::default();
        let weak = bus.downgrade();
        assert!(weak.subscribe().is_some());

        drop(bus);
        assert!(weak.subscribe().is_none());
    }

    #[test]
    fn test_gateway_dispatch_decodes() {
        let dispatch: GatewayDispatch =
            serde_json::from_value(json!({ "t": "GUILD_CREATE", "d": { "id": "1" } })).unwrap();
        assert_eq!(dispatch.t, "GUILD_CREATE");
        assert_eq!(dispatch.d["id"], "1");
    }
}
