//! Barry Runtime - configuration, logging and orchestration for the Barry
//! Discord framework.
//!
//! This crate provides:
//! - Layered configuration (`barry.toml` / `barry.yaml`, `BARRY_*`
//!   environment variables) with validation
//! - Logging setup on `tracing-subscriber`
//! - [`BarryRuntime`]: builds the REST client and the
//!   [`Client`](barry_framework::Client), syncs commands, serves the
//!   interactions endpoint and handles graceful shutdown
//!
//! # Transports
//!
//! The runtime uses whatever `barry-transport` features are enabled:
//!
//! - `http-client`: the REST client is built from `discord.token`
//! - `http-server`: `server.enabled = true` starts the signed interactions
//!   endpoint
//!
//! ```ignore
//! use barry_runtime::BarryRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = BarryRuntime::builder()
//!         .command(ping_command())
//!         .build()?;
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{BarryConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{BarryRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
