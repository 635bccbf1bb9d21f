//! Runtime orchestration.
//!
//! [`BarryRuntime`] owns the loaded configuration and one [`Client`], and
//! drives the process lifecycle:
//!
//! 1. load and validate configuration, install logging
//! 2. build the REST client and the [`Client`]
//! 3. on start, initialize modules, optionally sync commands and start the
//!    interactions endpoint
//! 4. run until Ctrl+C, SIGTERM or [`BarryRuntime::shutdown_token`] fires
//!
//! ```rust,ignore
//! use barry_runtime::BarryRuntime;
//!
//! let runtime = BarryRuntime::builder()
//!     .config_file("barry.toml")
//!     .module(Arc::new(Leveling::new(store)))
//!     .command(ping_command())
//!     .build()?;
//!
//! runtime.run().await?;
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use barry_core::{BoxedApi, GatewayDispatch, ListenerHandle};
use barry_framework::{BoxedModule, Client, Command, ErrorHook};
use futures::Stream;
use tokio::signal;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{BarryConfig, ConfigLoader, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// A configured bot process.
pub struct BarryRuntime {
    config: BarryConfig,
    client: Client,
    shutdown: CancellationToken,
    listener: Mutex<Option<ListenerHandle>>,
    running: AtomicBool,
}

impl BarryRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &BarryConfig {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Cancelling this token stops [`run`](Self::run) and detaches any event
    /// stream.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Address of the interactions endpoint, once started.
    pub async fn listener_addr(&self) -> Option<String> {
        self.listener.lock().await.as_ref().map(|h| h.addr.clone())
    }

    /// Initializes modules, syncs commands if configured and starts the
    /// interactions endpoint if enabled.
    pub async fn start(&self) -> RuntimeResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Runtime is already running");
            return Ok(());
        }

        info!(application_id = %self.client.application_id(), "Starting Barry runtime");

        let modules = self.client.initialize_modules().await;
        debug!(modules, "Modules initialized");

        if self.config.commands.sync_on_start {
            let summary = self.client.sync_commands().await?;
            info!(
                global = summary.global,
                guilds = summary.guilds.len(),
                "Application commands synced"
            );
        }

        if self.config.server.enabled {
            let handle = self.start_server().await?;
            *self.listener.lock().await = Some(handle);
        }

        info!("Runtime started");
        Ok(())
    }

    #[cfg(feature = "http-server")]
    async fn start_server(&self) -> RuntimeResult<ListenerHandle> {
        use barry_transport::{WebhookConfig, WebhookServer};

        use crate::config::ConfigError;

        let server = &self.config.server;
        let public_key = self
            .config
            .discord
            .public_key
            .clone()
            .ok_or_else(|| ConfigError::missing_field("discord.public_key"))?;

        let config = WebhookConfig::new(server.addr(), public_key)
            .path(server.path.clone())
            .response_timeout(server.response_timeout());
        let handle = WebhookServer::new(config)
            .listen(std::sync::Arc::new(self.client.clone()))
            .await?;
        Ok(handle)
    }

    #[cfg(not(feature = "http-server"))]
    async fn start_server(&self) -> RuntimeResult<ListenerHandle> {
        Err(crate::error::RuntimeError::ServerUnavailable)
    }

    /// Stops the interactions endpoint and cancels the shutdown token.
    pub async fn stop(&self) -> RuntimeResult<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Runtime is not running");
            return Ok(());
        }

        info!("Stopping Barry runtime");
        if let Some(handle) = self.listener.lock().await.take() {
            handle.stop();
        }
        self.shutdown.cancel();

        info!("Runtime stopped");
        Ok(())
    }

    /// Feeds a gateway stream to the client until it ends or shutdown is
    /// requested.
    pub async fn attach<S>(&self, stream: S) -> RuntimeResult<()>
    where
        S: Stream<Item = GatewayDispatch> + Send,
    {
        tokio::select! {
            result = self.client.attach(stream) => result.map_err(Into::into),
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested, detaching event source");
                Ok(())
            }
        }
    }

    /// Starts and runs until a shutdown signal.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.start().await?;
        info!("Barry runtime is now running. Press Ctrl+C to stop.");

        self.wait_for_shutdown().await;
        self.stop().await
    }

    /// Starts, consumes `stream` until it ends or a shutdown signal, then
    /// stops.
    pub async fn run_with<S>(&self, stream: S) -> RuntimeResult<()>
    where
        S: Stream<Item = GatewayDispatch> + Send,
    {
        self.start().await?;

        let result = tokio::select! {
            result = self.attach(stream) => result,
            _ = self.wait_for_shutdown() => Ok(()),
        };
        if let Err(e) = &result {
            error!(error = %e, "Event source failed");
        }

        self.stop().await?;
        result
    }

    /// Starts and runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        self.start().await?;

        tokio::select! {
            _ = shutdown => {}
            _ = self.shutdown.cancelled() => {}
        }

        self.stop().await
    }

    async fn wait_for_shutdown(&self) {
        tokio::select! {
            _ = wait_for_signal() => {}
            _ = self.shutdown.cancelled() => info!("Shutdown requested"),
        }
    }
}

impl std::fmt::Debug for BarryRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarryRuntime")
            .field("client", &self.client)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Completes on Ctrl+C or SIGTERM. Never completes if no handler could be
/// installed.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`BarryRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    api: Option<BoxedApi>,
    commands: Vec<Command>,
    modules: Vec<BoxedModule>,
    error_hook: Option<ErrorHook>,
    init_logging: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            api: None,
            commands: Vec::new(),
            modules: Vec::new(),
            error_hook: None,
            init_logging: true,
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration over every other source.
    pub fn merge(mut self, config: BarryConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses this API instead of building a REST client.
    pub fn api(mut self, api: BoxedApi) -> Self {
        self.api = Some(api);
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

    /// Skips installing the global subscriber.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> RuntimeResult<BarryRuntime> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let api = match self.api {
            Some(api) => api,
            None => default_api(&config)?,
        };

        let mut builder = Client::builder(api, config.discord.application_id.clone());
        for module in self.modules {
            builder = builder.module(module);
        }
        for command in self.commands {
            builder = builder.command(command);
        }
        if let Some(hook) = self.error_hook {
            builder = builder.error_hook(hook);
        }
        let client = builder.build();

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            server = config.server.enabled,
            "Runtime initialized from configuration"
        );

        Ok(BarryRuntime {
            config,
            client,
            shutdown: CancellationToken::new(),
            listener: Mutex::new(None),
            running: AtomicBool::new(false),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http-client")]
fn default_api(config: &BarryConfig) -> RuntimeResult<BoxedApi> {
    let discord = &config.discord;
    let client = barry_transport::RestClient::with_options(
        &discord.token,
        &discord.api_base_url,
        discord.request_timeout(),
    )?;
    Ok(std::sync::Arc::new(client))
}

#[cfg(not(feature = "http-client"))]
fn default_api(_config: &BarryConfig) -> RuntimeResult<BoxedApi> {
    Err(crate::error::RuntimeError::MissingApi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use barry_core::model::{InteractionResponse, Message, MessagePayload};
    use barry_core::{ApiError, ApiResult, InteractionApi};
    use barry_framework::Module;
    use serde_json::{Value, json};
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct SyncRecorder {
        global: AtomicUsize,
        guild: AtomicUsize,
    }

    #[async_trait]
    impl InteractionApi for SyncRecorder {
        async fn create_interaction_response(
            &self,
            _: &str,
            _: &str,
            _: InteractionResponse,
        ) -> ApiResult<()> {
            Err(ApiError::NotSupported)
        }

        async fn create_followup_message(
            &self,
            _: &str,
            _: &str,
            _: MessagePayload,
        ) -> ApiResult<Message> {
            Err(ApiError::NotSupported)
        }

        async fn get_followup_message(&self, _: &str, _: &str, _: &str) -> ApiResult<Message> {
            Err(ApiError::NotSupported)
        }

        async fn edit_followup_message(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: MessagePayload,
        ) -> ApiResult<Message> {
            Err(ApiError::NotSupported)
        }

        async fn delete_followup_message(&self, _: &str, _: &str, _: &str) -> ApiResult<()> {
            Err(ApiError::NotSupported)
        }

        async fn bulk_overwrite_global_commands(&self, _: &str, commands: Vec<Value>) -> ApiResult<()> {
            self.global.fetch_add(commands.len(), Ordering::SeqCst);
            Ok(())
        }

        async fn bulk_overwrite_guild_commands(
            &self,
            _: &str,
            _: &str,
            commands: Vec<Value>,
        ) -> ApiResult<()> {
            self.guild.fetch_add(commands.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    struct Leveling {
        initialized: AtomicBool,
    }

    #[async_trait]
    impl Module for Leveling {
        fn id(&self) -> &str {
            "leveling"
        }

        fn commands(&self) -> Vec<Command> {
            vec![Command::chat_input("rank", "Show your rank").guild("200")]
        }

        async fn initialize(&self) -> anyhow::Result<()> {
            self.initialized.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(sync_on_start: bool) -> BarryConfig {
        let mut config = BarryConfig::default();
        config.discord.token = "token".into();
        config.discord.application_id = "100".into();
        config.commands.sync_on_start = sync_on_start;
        config
    }

    fn builder(config: BarryConfig, api: Arc<SyncRecorder>) -> RuntimeBuilder {
        BarryRuntime::builder()
            .search_path("/nonexistent")
            .without_env()
            .without_logging()
            .merge(config)
            .api(api)
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = config(false);
        config.discord.token.clear();

        let result = builder(config, Arc::default()).build();
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[cfg(not(feature = "http-client"))]
    #[test]
    fn test_build_without_api() {
        let result = BarryRuntime::builder()
            .search_path("/nonexistent")
            .without_env()
            .without_logging()
            .merge(config(false))
            .build();
        assert!(matches!(result, Err(RuntimeError::MissingApi)));
    }

    #[tokio::test]
    async fn test_start_initializes_modules_and_syncs() {
        let api = Arc::new(SyncRecorder::default());
        let leveling = Arc::new(Leveling {
            initialized: AtomicBool::new(false),
        });
        let runtime = builder(config(true), Arc::clone(&api))
            .module(leveling.clone())
            .command(Command::chat_input("ping", "Pong"))
            .build()
            .unwrap();

        assert_eq!(runtime.client().application_id(), "100");
        runtime.start().await.unwrap();

        assert!(runtime.is_running());
        assert!(leveling.initialized.load(Ordering::SeqCst));
        assert_eq!(api.global.load(Ordering::SeqCst), 1);
        assert_eq!(api.guild.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.listener_addr().await, None);
    }

    #[tokio::test]
    async fn test_sync_is_opt_in() {
        let api = Arc::new(SyncRecorder::default());
        let runtime = builder(config(false), Arc::clone(&api))
            .command(Command::chat_input("ping", "Pong"))
            .build()
            .unwrap();

        runtime.start().await.unwrap();
        assert_eq!(api.global.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_until_stops() {
        let runtime = builder(config(false), Arc::default()).build().unwrap();
        let token = runtime.shutdown_token();

        runtime.run_until(async {}).await.unwrap();

        assert!(!runtime.is_running());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_detaches_event_source() {
        let runtime = builder(config(false), Arc::default()).build().unwrap();
        let token = runtime.shutdown_token();

        let attach = runtime.attach(futures::stream::pending::<GatewayDispatch>());
        let cancel = async {
            tokio::task::yield_now().await;
            token.cancel();
        };
        let (result, ()) = tokio::join!(attach, cancel);
        assert!(result.is_ok());

        // The source is released again.
        let stream = futures::stream::iter(vec![GatewayDispatch::new("READY", json!({}))]);
        assert!(runtime.client().attach(stream).await.is_ok());
    }

    #[cfg(not(feature = "http-server"))]
    #[tokio::test]
    async fn test_enabled_server_needs_feature() {
        let mut config = config(false);
        config.server.enabled = true;
        config.discord.public_key = Some("ab".repeat(32));

        let runtime = builder(config, Arc::default()).build().unwrap();
        assert!(matches!(
            runtime.start().await,
            Err(RuntimeError::ServerUnavailable)
        ));
    }
}
