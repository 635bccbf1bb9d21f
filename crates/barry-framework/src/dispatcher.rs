//! Application command dispatch.
//!
//! [`ApplicationCommandHandler`] turns a command interaction into a handler
//! call:
//!
//! 1. Resolve the command through the registry; unknown commands are ignored.
//! 2. In a guild, refuse when the command's module is disabled or the bot
//!    lacks the command's permissions.
//! 3. Refuse while the user's cooldown is active, otherwise start one.
//! 4. Resolve options (chat-input) or the target (context menus).
//! 5. Check the handler can run this command type.
//! 6. Run the handler.
//!
//! [`handle`](ApplicationCommandHandler::handle) contains every failure:
//! errors are logged and passed to the optional error hook, never
//! propagated to the pipeline.

use std::sync::Arc;
use std::time::SystemTime;

use barry_core::model::CommandType;
use barry_core::snowflake::relative_timestamp;
use barry_core::{AutocompleteInteraction, CommandInteraction, Interaction, TypedInteraction};
use futures::future::BoxFuture;
use tracing::{Instrument, Level, debug, error, info, span};

use crate::command::{CommandHandler, FocusedOption};
use crate::cooldown::{CooldownKey, CooldownManager};
use crate::error::{CommandError, CommandResult, ValidationError};
use crate::module::ModuleRegistry;
use crate::options::resolve_options;
use crate::registry::{CommandRegistry, ResolvedCommand, Scope};

/// Refusal when the command's module is disabled in the guild.
pub const MODULE_DISABLED: &str = "This command is currently disabled for this guild.";

/// Refusal when the bot lacks the command's permissions.
pub const INSUFFICIENT_PERMISSIONS: &str = "I have insufficient permissions to execute the command.";

/// Called with every contained command failure.
pub type ErrorHook =
    Arc<dyn Fn(CommandInteraction, Arc<CommandError>) -> BoxFuture<'static, ()> + Send + Sync>;

/// What happened to a dispatched interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No registered command (or callback) matched.
    Ignored,
    /// The handler ran to completion.
    Executed,
}

/// Dispatches application command and autocomplete interactions.
pub struct ApplicationCommandHandler {
    commands: Arc<CommandRegistry>,
    modules: Arc<ModuleRegistry>,
    cooldowns: CooldownManager,
    error_hook: Option<ErrorHook>,
}

impl ApplicationCommandHandler {
    pub fn new(commands: Arc<CommandRegistry>, modules: Arc<ModuleRegistry>) -> Self {
        Self {
            commands,
            modules,
            cooldowns: CooldownManager::new(),
            error_hook: None,
        }
    }

    /// Sets a hook receiving every contained failure, e.g. to tell the user
    /// why a command was refused.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn cooldowns(&self) -> &CooldownManager {
        &self.cooldowns
    }

    /// Routes an interaction and contains any failure.
    pub async fn handle(&self, interaction: Arc<Interaction>) {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            interaction_id = %interaction.id(),
            guild_id = interaction.guild_id().unwrap_or("dm"),
        );

        async move {
            match TypedInteraction::from(interaction) {
                TypedInteraction::Command(command) => self.handle_command(command).await,
                TypedInteraction::Autocomplete(autocomplete) => {
                    self.handle_autocomplete(autocomplete).await
                }
                _ => {}
            }
        }
        .instrument(span)
        .await
    }

    async fn handle_command(&self, interaction: CommandInteraction) {
        let name = interaction.command_name().to_string();
        match self.dispatch(interaction.clone()).await {
            Ok(DispatchOutcome::Executed) => debug!(command = %name, "Command executed"),
            Ok(DispatchOutcome::Ignored) => debug!(command = %name, "Unknown command ignored"),
            Err(err) => {
                if let Some(validation) = err.as_validation() {
                    info!(command = %name, reason = %validation, "Command refused");
                } else {
                    error!(command = %name, error = %err, "Command failed");
                }
                if let Some(hook) = &self.error_hook {
                    hook(interaction, Arc::new(err)).await;
                }
            }
        }
    }

    async fn handle_autocomplete(&self, interaction: AutocompleteInteraction) {
        let name = interaction.command_name().to_string();
        if let Err(err) = self.dispatch_autocomplete(interaction).await {
            error!(command = %name, error = %err, "Autocomplete failed");
        }
    }

    /// Runs a command interaction through every dispatch step.
    pub async fn dispatch(&self, interaction: CommandInteraction) -> CommandResult<DispatchOutcome> {
        let Some(command) = self.commands.get(&interaction)? else {
            return Ok(DispatchOutcome::Ignored);
        };

        self.check_guild(&interaction, &command).await?;
        self.check_cooldown(&interaction, &command, SystemTime::now())?;

        let data = interaction.command_data();
        let handler = command.leaf.handler().clone();
        match (handler, data.kind) {
            (CommandHandler::ChatInput(handler), CommandType::ChatInput) => {
                let options = resolve_options(data, &command.leaf)?;
                handler(interaction, options)
                    .await
                    .map_err(CommandError::from_handler)?;
            }
            (CommandHandler::Message(handler), CommandType::Message) => {
                let message = data
                    .target_id
                    .as_deref()
                    .and_then(|id| data.resolved.messages.get(id))
                    .cloned()
                    .ok_or(CommandError::MissingTargetMessage)?;
                handler(interaction, message)
                    .await
                    .map_err(CommandError::from_handler)?;
            }
            (CommandHandler::User(handler), CommandType::User) => {
                let target = data.target_id.as_deref();
                let user = target
                    .and_then(|id| data.resolved.users.get(id))
                    .cloned()
                    .ok_or(CommandError::MissingTargetUser)?;
                let member = target.and_then(|id| data.resolved.member(id));
                handler(interaction, user, member)
                    .await
                    .map_err(CommandError::from_handler)?;
            }
            (CommandHandler::None, _) => {
                return Err(CommandError::MissingHandler {
                    name: command.qualified_name(),
                });
            }
            _ => {
                return Err(CommandError::InvalidCommandType {
                    expected: command.leaf.kind().as_str(),
                });
            }
        }

        Ok(DispatchOutcome::Executed)
    }

    /// Routes an autocomplete request to the command's callback.
    pub async fn dispatch_autocomplete(
        &self,
        interaction: AutocompleteInteraction,
    ) -> CommandResult<DispatchOutcome> {
        let Some(command) = self.commands.resolve(interaction.command_data())? else {
            return Ok(DispatchOutcome::Ignored);
        };
        if let (Some(module_id), Some(guild_id)) = (command.module_id(), interaction.guild_id())
            && !self.modules.is_enabled(module_id, guild_id).await
        {
            return Ok(DispatchOutcome::Ignored);
        }
        let Some(callback) = command.leaf.autocomplete_handler().cloned() else {
            return Ok(DispatchOutcome::Ignored);
        };
        let Some(focused) = interaction.focused_option().map(|o| FocusedOption {
            name: o.name.clone(),
            kind: o.kind,
            value: o.value.clone().unwrap_or_default(),
        }) else {
            return Ok(DispatchOutcome::Ignored);
        };

        callback(interaction, focused)
            .await
            .map_err(CommandError::from_handler)?;
        Ok(DispatchOutcome::Executed)
    }

    async fn check_guild(
        &self,
        interaction: &CommandInteraction,
        command: &ResolvedCommand,
    ) -> CommandResult<()> {
        let Some(guild_id) = interaction.guild_id() else {
            return Ok(());
        };

        if let Some(module_id) = command.module_id()
            && !self.modules.is_enabled(module_id, guild_id).await
        {
            return Err(ValidationError::new(MODULE_DISABLED).into());
        }

        // Unreported permissions are not checked.
        let required = command.app_permissions();
        if !required.is_empty()
            && let Some(granted) = interaction.app_permissions()
            && !granted.contains(required)
        {
            return Err(ValidationError::new(INSUFFICIENT_PERMISSIONS).into());
        }
        Ok(())
    }

    fn check_cooldown(
        &self,
        interaction: &CommandInteraction,
        command: &ResolvedCommand,
        now: SystemTime,
    ) -> CommandResult<()> {
        let Some(duration) = command.cooldown() else {
            return Ok(());
        };
        let key = CooldownKey::new(
            Scope::from_guild(interaction.guild_id()),
            command.qualified_name(),
            interaction.user().id.as_str(),
        );
        self.cooldowns.acquire(key, duration, now).map_err(|expiry| {
            ValidationError::new(format!(
                "You are on cooldown. You can use this command again {}.",
                relative_timestamp(expiry)
            ))
            .into()
        })
    }
}

impl std::fmt::Debug for ApplicationCommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationCommandHandler")
            .field("commands", &self.commands.len())
            .field("modules", &self.modules.len())
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}

