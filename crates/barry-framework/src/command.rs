//! Command definitions.
//!
//! A [`Command`] describes one application command: its identity, where it is
//! registered, the gates the dispatcher applies before running it, and the
//! handler itself. Chat-input commands may carry a tree of child commands
//! (subcommands and subcommand groups).
//!
//! # Example
//!
//! ```rust,ignore
//! let convert = Command::chat_input("convert", "Convert between units")
//!     .cooldown(Duration::from_secs(5))
//!     .option(OptionDefinition::number("value", "Amount to convert").required())
//!     .option(OptionDefinition::string("unit", "Target unit").autocomplete())
//!     .on_chat_input(|interaction, options| async move {
//!         let value = options.number("value").unwrap_or_default();
//!         interaction.create_message(format!("{value}")).await?;
//!         Ok(())
//!     });
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use barry_core::model::{Choice, CommandType, Member, Message, OptionType, Permissions, User};
use barry_core::{AutocompleteInteraction, CommandInteraction};
use futures::future::BoxFuture;
use serde_json::{Map, Value, json};

use crate::options::ResolvedOptions;

// =============================================================================
// Handlers
// =============================================================================

/// Result returned by command handlers.
pub type HandlerResult = anyhow::Result<()>;

/// Handler of a chat-input command.
pub type ChatInputHandler =
    Arc<dyn Fn(CommandInteraction, ResolvedOptions) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Handler of a message context-menu command, given the target message.
pub type MessageCommandHandler =
    Arc<dyn Fn(CommandInteraction, Message) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Handler of a user context-menu command, given the target user and, in a
/// guild, the target member.
pub type UserCommandHandler = Arc<
    dyn Fn(CommandInteraction, User, Option<Member>) -> BoxFuture<'static, HandlerResult>
        + Send
        + Sync,
>;

/// Autocomplete callback, given the focused option's name and current input.
pub type AutocompleteHandler = Arc<
    dyn Fn(AutocompleteInteraction, FocusedOption) -> BoxFuture<'static, HandlerResult>
        + Send
        + Sync,
>;

/// The option the user is typing into.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedOption {
    pub name: String,
    pub kind: OptionType,
    /// The partial input, as sent.
    pub value: Value,
}

impl FocusedOption {
    /// The partial input as text.
    pub fn text(&self) -> &str {
        self.value.as_str().unwrap_or_default()
    }
}

/// The runnable part of a command.
#[derive(Clone, Default)]
pub enum CommandHandler {
    #[default]
    None,
    ChatInput(ChatInputHandler),
    Message(MessageCommandHandler),
    User(UserCommandHandler),
}

impl CommandHandler {
    /// The command type this handler can run.
    pub fn command_type(&self) -> Option<CommandType> {
        match self {
            Self::None => None,
            Self::ChatInput(_) => Some(CommandType::ChatInput),
            Self::Message(_) => Some(CommandType::Message),
            Self::User(_) => Some(CommandType::User),
        }
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::ChatInput(_) => "ChatInput",
            Self::Message(_) => "Message",
            Self::User(_) => "User",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Option Definitions
// =============================================================================

/// A declared option of a chat-input command.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDefinition {
    pub name: String,
    pub description: String,
    pub kind: OptionType,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub autocomplete: bool,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub channel_types: Vec<u8>,
    /// Resolve a user option to the guild member. Not sent to Discord.
    pub wants_member: bool,
}

macro_rules! option_constructors {
    ($($(#[$meta:meta])* $fn_name:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(name: impl Into<String>, description: impl Into<String>) -> Self {
                Self::new(name, description, OptionType::$kind)
            }
        )*
    };
}

impl OptionDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            choices: Vec::new(),
            autocomplete: false,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            channel_types: Vec::new(),
            wants_member: false,
        }
    }

    option_constructors! {
        string => String,
        integer => Integer,
        number => Number,
        boolean => Boolean,
        user => User,
        channel => Channel,
        role => Role,
        mentionable => Mentionable,
        attachment => Attachment,
    }

    /// A user option resolved to the guild member.
    pub fn member(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut option = Self::user(name, description);
        option.wants_member = true;
        option
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    pub fn min_value(mut self, value: impl Into<Value>) -> Self {
        self.min_value = Some(value.into());
        self
    }

    pub fn max_value(mut self, value: impl Into<Value>) -> Self {
        self.max_value = Some(value.into());
        self
    }

    pub fn min_length(mut self, length: u16) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: u16) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn channel_types(mut self, channel_types: impl IntoIterator<Item = u8>) -> Self {
        self.channel_types = channel_types.into_iter().collect();
        self
    }

    fn to_json(&self) -> Value {
        let mut option = Map::new();
        option.insert("type".into(), json!(u8::from(self.kind)));
        option.insert("name".into(), json!(self.name));
        option.insert("description".into(), json!(self.description));
        if self.required {
            option.insert("required".into(), json!(true));
        }
        if !self.choices.is_empty() {
            option.insert("choices".into(), json!(self.choices));
        }
        if self.autocomplete {
            option.insert("autocomplete".into(), json!(true));
        }
        let optional = [
            ("min_value", self.min_value.clone()),
            ("max_value", self.max_value.clone()),
            ("min_length", self.min_length.map(Value::from)),
            ("max_length", self.max_length.map(Value::from)),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                option.insert(key.into(), value);
            }
        }
        if !self.channel_types.is_empty() {
            option.insert("channel_types".into(), json!(self.channel_types));
        }
        Value::Object(option)
    }
}

// =============================================================================
// Command
// =============================================================================

/// An application command definition.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: String,
    kind: CommandType,
    guilds: Vec<String>,
    module: Option<String>,
    cooldown: Option<Duration>,
    app_permissions: Permissions,
    default_member_permissions: Option<Permissions>,
    dm_permission: Option<bool>,
    nsfw: bool,
    options: Vec<OptionDefinition>,
    children: Vec<Arc<Command>>,
    handler: CommandHandler,
    autocomplete: Option<AutocompleteHandler>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("guilds", &self.guilds)
            .field("module", &self.module)
            .field("cooldown", &self.cooldown)
            .field("app_permissions", &self.app_permissions)
            .field("options", &self.options)
            .field("children", &self.children)
            .field("handler", &self.handler)
            .field("autocomplete", &self.autocomplete.is_some())
            .finish_non_exhaustive()
    }
}

impl Command {
    fn new(name: impl Into<String>, description: impl Into<String>, kind: CommandType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            guilds: Vec::new(),
            module: None,
            cooldown: None,
            app_permissions: Permissions::empty(),
            default_member_permissions: None,
            dm_permission: None,
            nsfw: false,
            options: Vec::new(),
            children: Vec::new(),
            handler: CommandHandler::None,
            autocomplete: None,
        }
    }

    /// A slash command. Also used for subcommands and subcommand groups.
    pub fn chat_input(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, CommandType::ChatInput)
    }

    /// A context-menu command on messages.
    pub fn message(name: impl Into<String>) -> Self {
        Self::new(name, "", CommandType::Message)
    }

    /// A context-menu command on users.
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, "", CommandType::User)
    }

    // ----- Builder -----

    /// Registers the command in a guild instead of globally. May be repeated.
    pub fn guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guilds.push(guild_id.into());
        self
    }

    pub fn guilds<I, S>(mut self, guild_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guilds.extend(guild_ids.into_iter().map(Into::into));
        self
    }

    /// Attaches the command to a module, gating it on the module's per-guild
    /// enablement.
    pub fn module(mut self, module_id: impl Into<String>) -> Self {
        self.module = Some(module_id.into());
        self
    }

    /// Minimum interval between two invocations by the same user.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Permissions the bot needs in the invoking channel.
    pub fn app_permissions(mut self, permissions: Permissions) -> Self {
        self.app_permissions = permissions;
        self
    }

    pub fn default_member_permissions(mut self, permissions: Permissions) -> Self {
        self.default_member_permissions = Some(permissions);
        self
    }

    pub fn dm_permission(mut self, allowed: bool) -> Self {
        self.dm_permission = Some(allowed);
        self
    }

    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a subcommand, or a subcommand group when `child` has children.
    pub fn child(mut self, child: Command) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn on_chat_input<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(CommandInteraction, ResolvedOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = CommandHandler::ChatInput(Arc::new(move |i, o| Box::pin(handler(i, o))));
        self
    }

    pub fn on_message<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(CommandInteraction, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = CommandHandler::Message(Arc::new(move |i, m| Box::pin(handler(i, m))));
        self
    }

    pub fn on_user<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(CommandInteraction, User, Option<Member>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler =
            CommandHandler::User(Arc::new(move |i, u, m| Box::pin(handler(i, u, m))));
        self
    }

    pub fn on_autocomplete<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(AutocompleteInteraction, FocusedOption) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.autocomplete = Some(Arc::new(move |i, f| Box::pin(handler(i, f))));
        self
    }

    // ----- Accessors -----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    /// Guilds the command is registered in; empty for a global command.
    pub fn guild_ids(&self) -> &[String] {
        &self.guilds
    }

    pub fn is_global(&self) -> bool {
        self.guilds.is_empty()
    }

    pub fn module_id(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn cooldown_duration(&self) -> Option<Duration> {
        self.cooldown
    }

    pub fn required_app_permissions(&self) -> Permissions {
        self.app_permissions
    }

    pub fn options(&self) -> &[OptionDefinition] {
        &self.options
    }

    pub fn option_definition(&self, name: &str) -> Option<&OptionDefinition> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn children(&self) -> &[Arc<Command>] {
        &self.children
    }

    pub fn find_child(&self, name: &str) -> Option<&Arc<Command>> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    pub fn autocomplete_handler(&self) -> Option<&AutocompleteHandler> {
        self.autocomplete.as_ref()
    }

    // ----- Serialization -----

    /// The definition as sent to the bulk overwrite endpoints.
    pub fn to_json(&self) -> Value {
        let mut command = Map::new();
        command.insert("name".into(), json!(self.name));
        command.insert("type".into(), json!(u8::from(self.kind)));
        command.insert("description".into(), json!(self.description));

        if self.kind == CommandType::ChatInput {
            let options = self.options_json();
            if !options.is_empty() {
                command.insert("options".into(), Value::Array(options));
            }
        }
        if let Some(permissions) = self.default_member_permissions {
            command.insert(
                "default_member_permissions".into(),
                json!(permissions.bits().to_string()),
            );
        }
        if let Some(allowed) = self.dm_permission {
            command.insert("dm_permission".into(), json!(allowed));
        }
        if self.nsfw {
            command.insert("nsfw".into(), json!(true));
        }
        Value::Object(command)
    }

    fn options_json(&self) -> Vec<Value> {
        if self.children.is_empty() {
            return self.options.iter().map(OptionDefinition::to_json).collect();
        }
        self.children
            .iter()
            .map(|child| {
                let kind = if child.has_children() {
                    OptionType::SubcommandGroup
                } else {
                    OptionType::Subcommand
                };
                let mut option = json!({
                    "type": u8::from(kind),
                    "name": child.name,
                    "description": child.description,
                });
                let options = child.options_json();
                if !options.is_empty() {
                    option["options"] = Value::Array(options);
                }
                option
            })
            .collect()
    }
}
