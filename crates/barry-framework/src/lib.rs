//! # Barry Framework
//!
//! Commands, modules and the client pipeline for the Barry Discord bot.
//!
//! This layer provides:
//! - [`Command`] definitions with options, subcommands, cooldowns and
//!   permission requirements
//! - [`CommandRegistry`]: scoped storage, lookup by interaction and bulk sync
//! - [`ApplicationCommandHandler`]: gating, option resolution and handler
//!   invocation with error containment
//! - [`Module`]s with per-guild enablement
//! - [`Client`]: the pipeline from raw events to the event bus and dispatcher
//!
//! Interactions, responses and awaits live in `barry-core`.

pub mod client;
pub mod command;
pub mod cooldown;
pub mod dispatcher;
pub mod error;
pub mod module;
pub mod options;
pub mod registry;

pub use client::{Client, ClientBuilder};
pub use command::{
    AutocompleteHandler, ChatInputHandler, Command, CommandHandler, FocusedOption, HandlerResult,
    MessageCommandHandler, OptionDefinition, UserCommandHandler,
};
pub use cooldown::{CooldownKey, CooldownManager};
pub use dispatcher::{
    ApplicationCommandHandler, DispatchOutcome, ErrorHook, INSUFFICIENT_PERMISSIONS,
    MODULE_DISABLED,
};
pub use error::{ClientError, ClientResult, CommandError, CommandResult, ValidationError};
pub use module::{BoxedModule, Module, ModuleRegistry};
pub use options::{Mentionable, OptionValue, ResolvedOptions, resolve_options};
pub use registry::{CommandKey, CommandRegistry, ResolvedCommand, Scope, SyncSummary};
