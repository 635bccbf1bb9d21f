//! # Barry
//!
//! A slash-command bot framework for Discord interactions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────┐     ┌────────────┐     ┌──────────────────────┐
//! │ Gateway stream / │────▶│ Client │────▶│ Dispatcher │────▶│ Command handler      │
//! │ Webhook server   │     │        │     │            │     │ (own task)           │
//! └──────────────────┘     └────────┘     └────────────┘     └──────────────────────┘
//!                              │
//!                              └──▶ EventBus ──▶ awaits, listeners
//! ```
//!
//! - **Runtime**: loads configuration, installs logging, owns the client
//! - **Client**: decodes interactions and emits every event on the bus
//! - **Dispatcher**: resolves commands, checks modules, permissions and
//!   cooldowns, and contains handler errors
//! - **Interactions**: reply exactly once, follow up, and await component
//!   clicks or modal submissions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use barry::prelude::*;
//!
//! async fn ping(interaction: CommandInteraction, _options: ResolvedOptions) -> HandlerResult {
//!     interaction.create_message("Pong!").await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = BarryRuntime::builder()
//!         .command(Command::chat_input("ping", "Check the bot is alive").on_chat_input(ping))
//!         .build()?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default) / `yaml-config`: configuration file formats
//! - `json-log`: JSON log lines
//! - `http-client` (default): REST client built from the configured token
//! - `http-server`: signed interactions endpoint
//! - `full-transport`: both transports

pub use barry_core as core;
pub use barry_framework as framework;
pub use barry_runtime as runtime;
pub use barry_transport as transport;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use barry::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use barry_runtime::{BarryConfig, BarryRuntime};

    // Interactions and wire types
    pub use barry_core::prelude::*;
    pub use barry_core::snowflake::relative_timestamp;

    // Commands and modules
    pub use barry_framework::{
        Client, Command, FocusedOption, HandlerResult, Mentionable, Module, OptionDefinition,
        OptionValue, ResolvedOptions, ValidationError,
    };
}
