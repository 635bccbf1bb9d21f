//! Configuration for the Barry runtime.
//!
//! Layered loading (defaults, files, `BARRY_*` environment variables,
//! programmatic overrides) and validation of the bot's settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BarryConfig, CommandsConfig, DiscordConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, ServerConfig, SpanEventConfig,
};
pub use validation::validate_config;
