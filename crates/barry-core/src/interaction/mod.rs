//! The interaction envelope.
//!
//! An [`Interaction`] is decoded once from a raw payload and then shared
//! (`Arc<Interaction>`) between the event bus, the dispatcher and any
//! handler awaiting follow-up events. Its identity, origin and variant
//! never change after construction; only the response lifecycle, guarded
//! by a lock, moves forward.
//!
//! # Example
//!
//! ```rust,ignore
//! let interaction = Arc::new(Interaction::from_value(payload, ctx)?);
//!
//! if let Some(command) = interaction.as_command() {
//!     command.create_message("pong".into()).await?;
//! }
//! ```

mod collector;
mod kinds;
mod response;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde_json::Value;

pub use collector::{AwaitComponentOptions, DEFAULT_AWAIT_TIMEOUT, UserFilter};
pub use kinds::{
    AutocompleteInteraction, CommandInteraction, ComponentInteraction, GuildInteraction,
    ModalSubmitInteraction, ReplyableInteraction, TypedInteraction,
};
pub use response::ResponseState;

use crate::api::BoxedApi;
use crate::capability::InitialResponder;
use crate::error::{DecodeError, DecodeResult};
use crate::event::{EventBus, WeakEventBus};
use crate::model::{
    ApplicationCommandData, CommandType, ComponentData, ComponentType, Member, Message,
    ModalSubmitData, PartialChannel, Permissions, RawInteraction, User,
};
use crate::snowflake;
use response::Lifecycle;

// =============================================================================
// Interaction Type
// =============================================================================

/// The interaction discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
    /// A type this version does not know about.
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::ApplicationCommandAutocomplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(value: InteractionType) -> Self {
        match value {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Unknown(other) => other,
        }
    }
}

// =============================================================================
// Interaction Data
// =============================================================================

/// Variant-specific payload, fixed at construction.
#[derive(Debug, Clone)]
pub enum InteractionData {
    Ping,
    ApplicationCommand(Arc<ApplicationCommandData>),
    Autocomplete(Arc<ApplicationCommandData>),
    MessageComponent(Arc<ComponentData>),
    ModalSubmit(Arc<ModalSubmitData>),
    /// Raw data of an unknown interaction type.
    Unknown(Option<Value>),
}

// =============================================================================
// Interaction Context
// =============================================================================

/// What an interaction needs from its client: a transport to answer with and
/// the event bus to await follow-up events on.
#[derive(Clone)]
pub struct InteractionContext {
    api: BoxedApi,
    events: WeakEventBus,
}

impl InteractionContext {
    pub fn new(api: BoxedApi, events: &EventBus) -> Self {
        Self {
            api,
            events: events.downgrade(),
        }
    }

    /// A context without an event bus; awaits resolve to `None` immediately.
    pub fn detached(api: BoxedApi) -> Self {
        Self {
            api,
            events: WeakEventBus::default(),
        }
    }

    pub fn api(&self) -> &BoxedApi {
        &self.api
    }
}

// =============================================================================
// Interaction
// =============================================================================

/// A decoded interaction.
pub struct Interaction {
    id: String,
    application_id: String,
    token: String,
    kind: InteractionType,
    guild_id: Option<String>,
    guild_locale: Option<String>,
    locale: Option<String>,
    channel: Option<PartialChannel>,
    channel_id: Option<String>,
    member: Option<Member>,
    user: User,
    app_permissions: Option<Permissions>,
    message: Option<Message>,
    data: InteractionData,
    lifecycle: Mutex<Lifecycle>,
    responder: Mutex<Option<InitialResponder>>,
    ctx: InteractionContext,
}

impl Interaction {
    /// Builds the interaction matching the payload's discriminant.
    ///
    /// Unknown discriminants produce an [`InteractionData::Unknown`]
    /// interaction instead of failing. Fails when no user can be derived or a
    /// field the variant requires is missing.
    pub fn from_raw(raw: RawInteraction, ctx: InteractionContext) -> DecodeResult<Self> {
        let user = raw
            .user
            .clone()
            .or_else(|| raw.member.as_ref().and_then(|m| m.user.clone()))
            .ok_or_else(|| DecodeError::MissingUser { id: raw.id.clone() })?;

        let kind = InteractionType::from(raw.kind);
        let data = match kind {
            InteractionType::Ping => InteractionData::Ping,
            InteractionType::ApplicationCommand => {
                InteractionData::ApplicationCommand(Arc::new(decode_data(&raw)?))
            }
            InteractionType::ApplicationCommandAutocomplete => {
                InteractionData::Autocomplete(Arc::new(decode_data(&raw)?))
            }
            InteractionType::MessageComponent => {
                if raw.message.is_none() {
                    return Err(DecodeError::MissingField {
                        id: raw.id,
                        field: "message",
                    });
                }
                InteractionData::MessageComponent(Arc::new(decode_data(&raw)?))
            }
            InteractionType::ModalSubmit => {
                InteractionData::ModalSubmit(Arc::new(decode_data(&raw)?))
            }
            InteractionType::Unknown(_) => InteractionData::Unknown(raw.data.clone()),
        };

        let channel_id = raw
            .channel_id
            .or_else(|| raw.channel.as_ref().map(|c| c.id.clone()));

        Ok(Self {
            id: raw.id,
            application_id: raw.application_id,
            token: raw.token,
            kind,
            guild_id: raw.guild_id,
            guild_locale: raw.guild_locale,
            locale: raw.locale,
            channel: raw.channel,
            channel_id,
            member: raw.member,
            user,
            app_permissions: raw.app_permissions,
            message: raw.message,
            data,
            lifecycle: Mutex::new(Lifecycle::default()),
            responder: Mutex::new(None),
            ctx,
        })
    }

    /// Decodes a raw JSON payload.
    pub fn from_value(value: Value, ctx: InteractionContext) -> DecodeResult<Self> {
        let raw: RawInteraction = serde_json::from_value(value)?;
        Self::from_raw(raw, ctx)
    }

    /// Attaches the slot the initial response should be written to instead of
    /// the REST callback.
    pub fn with_responder(mut self, responder: InitialResponder) -> Self {
        *self.responder.get_mut() = Some(responder);
        self
    }

    // ----- Identity and origin -----

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// The continuation token. Valid for 15 minutes after creation.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> InteractionType {
        self.kind
    }

    pub fn data(&self) -> &InteractionData {
        &self.data
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    pub fn guild_locale(&self) -> Option<&str> {
        self.guild_locale.as_deref()
    }

    /// The invoking user's selected language.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn channel(&self) -> Option<&PartialChannel> {
        self.channel.as_ref()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn member(&self) -> Option<&Member> {
        self.member.as_ref()
    }

    /// The invoking user; taken from the member when invoked in a guild.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Permissions the application has in the invoking channel.
    pub fn app_permissions(&self) -> Option<Permissions> {
        self.app_permissions
    }

    /// The message a component was attached to.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn created_at(&self) -> Option<SystemTime> {
        snowflake::created_at(&self.id)
    }

    pub(crate) fn ctx(&self) -> &InteractionContext {
        &self.ctx
    }

    // ----- Predicates -----

    pub fn is_ping(&self) -> bool {
        matches!(self.data, InteractionData::Ping)
    }

    pub fn is_application_command(&self) -> bool {
        matches!(self.data, InteractionData::ApplicationCommand(_))
    }

    pub fn is_chat_input_command(&self) -> bool {
        self.command_type() == Some(CommandType::ChatInput)
    }

    pub fn is_user_command(&self) -> bool {
        self.command_type() == Some(CommandType::User)
    }

    pub fn is_message_command(&self) -> bool {
        self.command_type() == Some(CommandType::Message)
    }

    pub fn is_autocomplete(&self) -> bool {
        matches!(self.data, InteractionData::Autocomplete(_))
    }

    pub fn is_message_component(&self) -> bool {
        matches!(self.data, InteractionData::MessageComponent(_))
    }

    pub fn is_button(&self) -> bool {
        matches!(&self.data, InteractionData::MessageComponent(d) if d.component_type == ComponentType::Button)
    }

    pub fn is_select_menu(&self) -> bool {
        matches!(&self.data, InteractionData::MessageComponent(d) if d.is_select())
    }

    pub fn is_modal_submit(&self) -> bool {
        matches!(self.data, InteractionData::ModalSubmit(_))
    }

    /// Whether this interaction can be answered with a message.
    pub fn is_repliable(&self) -> bool {
        matches!(
            self.data,
            InteractionData::ApplicationCommand(_)
                | InteractionData::MessageComponent(_)
                | InteractionData::ModalSubmit(_)
        )
    }

    /// Whether guild ID, guild locale and member are all present.
    pub fn in_guild(&self) -> bool {
        self.guild_id.is_some() && self.guild_locale.is_some() && self.member.is_some()
    }

    fn command_type(&self) -> Option<CommandType> {
        match &self.data {
            InteractionData::ApplicationCommand(data) => Some(data.kind),
            _ => None,
        }
    }

    // ----- Narrowing -----

    pub fn as_replyable(self: &Arc<Self>) -> Option<ReplyableInteraction> {
        ReplyableInteraction::from_interaction(Arc::clone(self))
    }

    pub fn as_command(self: &Arc<Self>) -> Option<CommandInteraction> {
        CommandInteraction::from_interaction(Arc::clone(self))
    }

    pub fn as_autocomplete(self: &Arc<Self>) -> Option<AutocompleteInteraction> {
        AutocompleteInteraction::from_interaction(Arc::clone(self))
    }

    pub fn as_message_component(self: &Arc<Self>) -> Option<ComponentInteraction> {
        ComponentInteraction::from_interaction(Arc::clone(self))
    }

    pub fn as_modal_submit(self: &Arc<Self>) -> Option<ModalSubmitInteraction> {
        ModalSubmitInteraction::from_interaction(Arc::clone(self))
    }
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("guild_id", &self.guild_id)
            .field("user", &self.user.id)
            .field("state", &self.response_state())
            .finish_non_exhaustive()
    }
}

fn decode_data<T: serde::de::DeserializeOwned>(raw: &RawInteraction) -> DecodeResult<T> {
    let data = raw.data.clone().ok_or_else(|| DecodeError::MissingField {
        id: raw.id.clone(),
        field: "data",
    })?;
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_chat_input_in_guild() {
        let interaction = decode(command_payload("ping", json!([])));

        assert_eq!(interaction.kind(), InteractionType::ApplicationCommand);
        assert!(interaction.is_application_command());
        assert!(interaction.is_chat_input_command());
        assert!(!interaction.is_message_component());
        assert!(interaction.in_guild());
        assert_eq!(interaction.user().id, USER_ID);
        assert_eq!(interaction.channel_id(), Some("300"));
    }

    #[test]
    fn test_user_taken_from_direct_user() {
        let mut payload = command_payload("ping", json!([]));
        payload.as_object_mut().unwrap().remove("member");
        payload["user"] = json!({ "id": "9", "username": "dm" });

        let interaction = decode(payload);
        assert_eq!(interaction.user().id, "9");
        assert!(!interaction.in_guild());
    }

    #[test]
    fn test_missing_user_fails() {
        let mut payload = command_payload("ping", json!([]));
        payload.as_object_mut().unwrap().remove("member");

        let err = Interaction::from_value(payload, detached_ctx()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingUser { .. }));
    }

    #[test]
    fn test_unknown_type_builds_base_interaction() {
        let mut payload = command_payload("ping", json!([]));
        payload["type"] = json!(42);

        let interaction = decode(payload);
        assert_eq!(interaction.kind(), InteractionType::Unknown(42));
        assert!(matches!(interaction.data(), InteractionData::Unknown(Some(_))));
        assert!(!interaction.is_repliable());
    }

    #[test]
    fn test_component_requires_message() {
        let mut payload = component_payload("confirm", ORIGINAL_ID, USER_ID);
        payload.as_object_mut().unwrap().remove("message");

        let err = Interaction::from_value(payload, detached_ctx()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "message", .. }));
    }

    #[test]
    fn test_component_predicates() {
        let interaction = decode(component_payload("confirm", ORIGINAL_ID, USER_ID));
        assert!(interaction.is_message_component());
        assert!(interaction.is_button());
        assert!(!interaction.is_select_menu());
        assert!(!interaction.is_application_command());
    }

    #[test]
    fn test_narrowing_matches_variant() {
        let interaction = Arc::new(decode(modal_payload("feedback")));
        assert!(interaction.as_modal_submit().is_some());
        assert!(interaction.as_command().is_none());
        assert!(interaction.as_message_component().is_none());
        assert!(interaction.as_replyable().is_some());
    }

    #[test]
    fn test_ping_decodes_without_data() {
        let interaction = decode(json!({
            "id": "1", "application_id": APP_ID, "type": 1, "token": "t",
            "user": { "id": "1", "username": "discord" }
        }));
        assert!(interaction.is_ping());
        assert!(Arc::new(interaction).as_replyable().is_none());
    }

    #[test]
    fn test_created_at_from_id() {
        let mut payload = command_payload("ping", json!([]));
        payload["id"] = json!("175928847299117063");

        let created = decode(payload).created_at().unwrap();
        let ms = created
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis();
        assert_eq!(ms, 1_462_015_105_796);
    }
}
