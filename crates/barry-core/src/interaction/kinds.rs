//! Typed views over an [`Interaction`].
//!
//! Each wrapper is a cheap handle around the shared `Arc<Interaction>` that
//! was checked against one variant when it was built, so variant-specific
//! accessors never fail.

use std::ops::Deref;
use std::sync::Arc;

use super::response::ResponseState;
use super::{Interaction, InteractionData};
use crate::error::ResponseResult;
use crate::model::{
    ApplicationCommandData, Choice, CommandDataOption, CommandType, ComponentData, ComponentType,
    InteractionResponse, Member, Message, MessagePayload, ModalSubmitData,
};

// =============================================================================
// Replyable
// =============================================================================

/// An interaction that can be answered with a message: application
/// commands, message components and modal submits.
#[derive(Debug, Clone)]
pub struct ReplyableInteraction(Arc<Interaction>);

impl ReplyableInteraction {
    pub fn from_interaction(interaction: Arc<Interaction>) -> Option<Self> {
        interaction.is_repliable().then(|| Self(interaction))
    }

    pub fn interaction(&self) -> &Arc<Interaction> {
        &self.0
    }

    pub fn into_inner(self) -> Arc<Interaction> {
        self.0
    }
}

impl Deref for ReplyableInteraction {
    type Target = Interaction;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Interaction> for ReplyableInteraction {
    fn as_ref(&self) -> &Interaction {
        &self.0
    }
}

// =============================================================================
// Application Command
// =============================================================================

/// A chat-input, user or message command invocation.
#[derive(Debug, Clone)]
pub struct CommandInteraction {
    inner: ReplyableInteraction,
    data: Arc<ApplicationCommandData>,
}

impl CommandInteraction {
    pub fn from_interaction(interaction: Arc<Interaction>) -> Option<Self> {
        let InteractionData::ApplicationCommand(data) = interaction.data() else {
            return None;
        };
        let data = Arc::clone(data);
        Some(Self {
            inner: ReplyableInteraction(interaction),
            data,
        })
    }

    pub fn command_data(&self) -> &ApplicationCommandData {
        &self.data
    }

    pub fn command_name(&self) -> &str {
        &self.data.name
    }

    pub fn command_type(&self) -> CommandType {
        self.data.kind
    }

    /// The targeted user or message, for context-menu commands.
    pub fn target_id(&self) -> Option<&str> {
        self.data.target_id.as_deref()
    }

    pub fn as_replyable(&self) -> &ReplyableInteraction {
        &self.inner
    }
}

impl Deref for CommandInteraction {
    type Target = ReplyableInteraction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<Interaction> for CommandInteraction {
    fn as_ref(&self) -> &Interaction {
        &self.inner
    }
}

// =============================================================================
// Autocomplete
// =============================================================================

/// A request for suggestions while the user types an option.
#[derive(Debug, Clone)]
pub struct AutocompleteInteraction {
    interaction: Arc<Interaction>,
    data: Arc<ApplicationCommandData>,
}

impl AutocompleteInteraction {
    pub fn from_interaction(interaction: Arc<Interaction>) -> Option<Self> {
        let InteractionData::Autocomplete(data) = interaction.data() else {
            return None;
        };
        let data = Arc::clone(data);
        Some(Self { interaction, data })
    }

    pub fn command_data(&self) -> &ApplicationCommandData {
        &self.data
    }

    pub fn command_name(&self) -> &str {
        &self.data.name
    }

    pub fn focused_option(&self) -> Option<&CommandDataOption> {
        self.data.focused_option()
    }

    /// Sends the suggestions. Only one result can be sent.
    pub async fn result(&self, choices: Vec<Choice>) -> ResponseResult<()> {
        self.interaction
            .send_initial(
                InteractionResponse::autocomplete(choices),
                ResponseState::Responded,
                None,
            )
            .await
    }
}

impl Deref for AutocompleteInteraction {
    type Target = Interaction;

    fn deref(&self) -> &Self::Target {
        &self.interaction
    }
}

impl AsRef<Interaction> for AutocompleteInteraction {
    fn as_ref(&self) -> &Interaction {
        &self.interaction
    }
}

// =============================================================================
// Message Component
// =============================================================================

/// A button press or select menu choice.
#[derive(Debug, Clone)]
pub struct ComponentInteraction {
    inner: ReplyableInteraction,
    data: Arc<ComponentData>,
    message: Message,
}

impl ComponentInteraction {
    pub fn from_interaction(interaction: Arc<Interaction>) -> Option<Self> {
        let InteractionData::MessageComponent(data) = interaction.data() else {
            return None;
        };
        let data = Arc::clone(data);
        let message = interaction.message()?.clone();
        Some(Self {
            inner: ReplyableInteraction(interaction),
            data,
            message,
        })
    }

    pub fn component_data(&self) -> &ComponentData {
        &self.data
    }

    pub fn custom_id(&self) -> &str {
        &self.data.custom_id
    }

    pub fn component_type(&self) -> ComponentType {
        self.data.component_type
    }

    /// Selected values, for select menus.
    pub fn values(&self) -> &[String] {
        &self.data.values
    }

    /// The message the component is attached to.
    pub fn parent_message(&self) -> &Message {
        &self.message
    }

    /// Acknowledges without changing the parent message.
    pub async fn defer_update(&self) -> ResponseResult<()> {
        self.inner
            .send_initial(
                InteractionResponse::deferred_update(),
                ResponseState::Deferred,
                Some(self.message.id.clone()),
            )
            .await
    }

    /// Edits the parent message as the initial response.
    pub async fn edit_parent(&self, payload: impl Into<MessagePayload>) -> ResponseResult<()> {
        self.inner
            .send_initial(
                InteractionResponse::update(payload.into()),
                ResponseState::Responded,
                Some(self.message.id.clone()),
            )
            .await
    }

    pub fn as_replyable(&self) -> &ReplyableInteraction {
        &self.inner
    }
}

impl Deref for ComponentInteraction {
    type Target = ReplyableInteraction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<Interaction> for ComponentInteraction {
    fn as_ref(&self) -> &Interaction {
        &self.inner
    }
}

// =============================================================================
// Modal Submit
// =============================================================================

/// A submitted modal.
#[derive(Debug, Clone)]
pub struct ModalSubmitInteraction {
    inner: ReplyableInteraction,
    data: Arc<ModalSubmitData>,
}

impl ModalSubmitInteraction {
    pub fn from_interaction(interaction: Arc<Interaction>) -> Option<Self> {
        let InteractionData::ModalSubmit(data) = interaction.data() else {
            return None;
        };
        let data = Arc::clone(data);
        Some(Self {
            inner: ReplyableInteraction(interaction),
            data,
        })
    }

    pub fn modal_data(&self) -> &ModalSubmitData {
        &self.data
    }

    pub fn custom_id(&self) -> &str {
        &self.data.custom_id
    }

    /// The submitted value of a text input.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.data.value(custom_id)
    }

    /// Acknowledges without changing the message the modal was opened from.
    pub async fn defer_update(&self) -> ResponseResult<()> {
        self.inner
            .send_initial(
                InteractionResponse::deferred_update(),
                ResponseState::Deferred,
                self.message().map(|m| m.id.clone()),
            )
            .await
    }

    /// Edits the message the modal was opened from.
    pub async fn edit_parent(&self, payload: impl Into<MessagePayload>) -> ResponseResult<()> {
        self.inner
            .send_initial(
                InteractionResponse::update(payload.into()),
                ResponseState::Responded,
                self.message().map(|m| m.id.clone()),
            )
            .await
    }

    pub fn as_replyable(&self) -> &ReplyableInteraction {
        &self.inner
    }
}

impl Deref for ModalSubmitInteraction {
    type Target = ReplyableInteraction;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AsRef<Interaction> for ModalSubmitInteraction {
    fn as_ref(&self) -> &Interaction {
        &self.inner
    }
}

// =============================================================================
// Typed Interaction
// =============================================================================

/// An interaction narrowed to its variant, for exhaustive matching.
#[derive(Debug, Clone)]
pub enum TypedInteraction {
    Ping(Arc<Interaction>),
    Command(CommandInteraction),
    Autocomplete(AutocompleteInteraction),
    Component(ComponentInteraction),
    ModalSubmit(ModalSubmitInteraction),
    Unknown(Arc<Interaction>),
}

impl From<Arc<Interaction>> for TypedInteraction {
    fn from(interaction: Arc<Interaction>) -> Self {
        match interaction.data() {
            InteractionData::Ping => Self::Ping(interaction),
            InteractionData::ApplicationCommand(data) => Self::Command(CommandInteraction {
                data: Arc::clone(data),
                inner: ReplyableInteraction(interaction),
            }),
            InteractionData::Autocomplete(data) => Self::Autocomplete(AutocompleteInteraction {
                data: Arc::clone(data),
                interaction,
            }),
            InteractionData::MessageComponent(_) => {
                match ComponentInteraction::from_interaction(Arc::clone(&interaction)) {
                    Some(component) => Self::Component(component),
                    None => Self::Unknown(interaction),
                }
            }
            InteractionData::ModalSubmit(data) => Self::ModalSubmit(ModalSubmitInteraction {
                data: Arc::clone(data),
                inner: ReplyableInteraction(interaction),
            }),
            InteractionData::Unknown(_) => Self::Unknown(interaction),
        }
    }
}

// =============================================================================
// Guild Interaction
// =============================================================================

/// An interaction known to come from a guild.
#[derive(Debug, Clone)]
pub struct GuildInteraction<T> {
    inner: T,
    guild_id: String,
    guild_locale: String,
    member: Member,
}

impl<T: AsRef<Interaction>> GuildInteraction<T> {
    /// Narrows `inner`, or returns `None` if it was not invoked in a guild.
    pub fn new(inner: T) -> Option<Self> {
        let interaction = inner.as_ref();
        let guild_id = interaction.guild_id()?.to_string();
        let guild_locale = interaction.guild_locale()?.to_string();
        let member = interaction.member()?.clone();
        Some(Self {
            inner,
            guild_id,
            guild_locale,
            member,
        })
    }
}

impl<T> GuildInteraction<T> {
    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    pub fn guild_locale(&self) -> &str {
        &self.guild_locale
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for GuildInteraction<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
