//! The client event pipeline.
//!
//! [`Client`] bridges one external event source (a gateway stream or the
//! webhook server) to the interaction envelope, the event bus and the
//! command dispatcher:
//!
//! ```text
//! GatewayDispatch ──▶ INTERACTION_CREATE ──▶ decode ──▶ emit ──▶ dispatch (own task)
//!                 └─▶ anything else ────────────────────▶ emit
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let client = Client::builder(api, application_id)
//!     .module(Arc::new(Leveling::new(store)))
//!     .command(ping_command())
//!     .build();
//!
//! client.initialize_modules().await;
//! client.sync_commands().await?;
//! client.attach(gateway_stream).await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use barry_core::event::DEFAULT_BUS_CAPACITY;
use barry_core::model::is_interaction_shaped;
use barry_core::{
    BoxedApi, ClientEvent, DecodeError, EventBus, GatewayDispatch, INTERACTION_CREATE,
    InitialResponder, Interaction, InteractionContext, InteractionReceiver,
};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::command::Command;
use crate::dispatcher::{ApplicationCommandHandler, ErrorHook};
use crate::error::{ClientError, ClientResult, CommandResult};
use crate::module::{BoxedModule, ModuleRegistry};
use crate::registry::{CommandRegistry, SyncSummary};

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Client`].
pub struct ClientBuilder {
    api: BoxedApi,
    application_id: String,
    bus_capacity: usize,
    commands: Vec<Command>,
    modules: Vec<BoxedModule>,
    error_hook: Option<ErrorHook>,
}

impl ClientBuilder {
    /// Number of events buffered per bus subscriber.
    ///
    /// A subscriber that falls further behind loses the oldest events.
    /// Component and modal waiters only count interactions against this
    /// limit; [`Client::subscribe`] receivers count every dispatch.
    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn module(mut self, module: BoxedModule) -> Self {
        self.modules.push(module);
        self
    }

    pub fn error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    pub fn build(self) -> Client {
        let commands = Arc::new(CommandRegistry::new());
        let modules = Arc::new(ModuleRegistry::new());

        for module in self.modules {
            for command in modules.add(module) {
                commands.add(command);
            }
        }
        for command in self.commands {
            commands.add(command);
        }

        let mut handler = ApplicationCommandHandler::new(Arc::clone(&commands), Arc::clone(&modules));
        if let Some(hook) = self.error_hook {
            handler = handler.with_error_hook(hook);
        }

        Client {
            inner: Arc::new(ClientInner {
                application_id: self.application_id,
                api: self.api,
                events: EventBus::new(self.bus_capacity),
                commands,
                modules,
                handler,
                attached: AtomicBool::new(false),
            }),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

struct ClientInner {
    application_id: String,
    api: BoxedApi,
    events: EventBus,
    commands: Arc<CommandRegistry>,
    modules: Arc<ModuleRegistry>,
    handler: ApplicationCommandHandler,
    attached: AtomicBool,
}

/// The event pipeline. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    pub fn builder(api: BoxedApi, application_id: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api,
            application_id: application_id.into(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
            commands: Vec::new(),
            modules: Vec::new(),
            error_hook: None,
        }
    }

    pub fn application_id(&self) -> &str {
        &self.inner.application_id
    }

    pub fn api(&self) -> &BoxedApi {
        &self.inner.api
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Subscribes to every event the client emits.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.inner.commands
    }

    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.inner.modules
    }

    pub fn handler(&self) -> &ApplicationCommandHandler {
        &self.inner.handler
    }

    /// Registers a command after construction.
    pub fn register_command(&self, command: Command) -> Arc<Command> {
        self.inner.commands.add(command)
    }

    /// Registers a module and its commands after construction.
    pub fn register_module(&self, module: BoxedModule) {
        for command in self.inner.modules.add(module) {
            self.inner.commands.add(command);
        }
    }

    /// Runs every module's `initialize` hook. Returns the number of failures.
    pub async fn initialize_modules(&self) -> usize {
        self.inner.modules.initialize_all().await
    }

    /// Pushes the registered commands to Discord.
    pub async fn sync_commands(&self) -> CommandResult<SyncSummary> {
        self.inner
            .commands
            .sync(self.inner.api.as_ref(), &self.inner.application_id)
            .await
    }

    /// The context interactions decoded by this client are bound to.
    pub fn interaction_context(&self) -> InteractionContext {
        InteractionContext::new(Arc::clone(&self.inner.api), &self.inner.events)
    }

    /// Decodes a raw interaction payload bound to this client.
    pub fn decode(&self, payload: Value) -> ClientResult<Interaction> {
        Ok(Interaction::from_value(payload, self.interaction_context())?)
    }

    /// Handles one gateway dispatch.
    ///
    /// Interactions are decoded, emitted and dispatched on their own task,
    /// whose handle is returned. Other dispatches are re-emitted verbatim.
    pub fn handle_dispatch(&self, dispatch: GatewayDispatch) -> Option<JoinHandle<()>> {
        if dispatch.t != INTERACTION_CREATE {
            trace!(event = %dispatch.t, "Re-emitting dispatch");
            self.inner.events.emit(ClientEvent::Dispatch {
                name: dispatch.t.into(),
                data: Arc::new(dispatch.d),
            });
            return None;
        }

        match self.decode(dispatch.d) {
            Ok(interaction) if interaction.is_ping() => {
                debug!(interaction_id = %interaction.id(), "Ignoring gateway ping");
                None
            }
            Ok(interaction) => Some(self.handle_interaction(interaction)),
            Err(e) => {
                warn!(error = %e, "Dropping undecodable interaction");
                None
            }
        }
    }

    /// Emits an interaction on the bus and dispatches it on a new task.
    pub fn handle_interaction(&self, interaction: Interaction) -> JoinHandle<()> {
        let interaction = Arc::new(interaction);
        debug!(
            interaction_id = %interaction.id(),
            kind = ?interaction.kind(),
            "Interaction received"
        );
        self.inner
            .events
            .emit(ClientEvent::InteractionCreate(Arc::clone(&interaction)));

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.handler.handle(interaction).await })
    }

    /// Consumes a gateway stream until it ends.
    ///
    /// Only one source may be attached at a time.
    pub async fn attach<S>(&self, stream: S) -> ClientResult<()>
    where
        S: Stream<Item = GatewayDispatch> + Send,
    {
        if self.inner.attached.swap(true, Ordering::SeqCst) {
            return Err(ClientError::SourceAlreadyAttached);
        }
        // Released on return and when this future is dropped mid-stream.
        let _attached = AttachGuard(&self.inner.attached);
        info!("Event source attached");

        futures::pin_mut!(stream);
        while let Some(dispatch) = stream.next().await {
            self.handle_dispatch(dispatch);
        }

        info!("Event source ended");
        Ok(())
    }
}

struct AttachGuard<'a>(&'a AtomicBool);

impl Drop for AttachGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("application_id", &self.inner.application_id)
            .field("commands", &self.inner.commands.len())
            .field("modules", &self.inner.modules.len())
            .finish()
    }
}

#[async_trait]
impl InteractionReceiver for Client {
    async fn receive_interaction(
        &self,
        payload: Value,
        responder: InitialResponder,
    ) -> Result<(), DecodeError> {
        if !is_interaction_shaped(&payload) {
            return Err(DecodeError::Json("body is not an interaction".into()));
        }
        let interaction =
            Interaction::from_value(payload, self.interaction_context())?.with_responder(responder);
        self.handle_interaction(interaction);
        Ok(())
    }
}
