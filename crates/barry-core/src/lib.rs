//! # Barry Core
//!
//! The interaction model of the Barry Discord framework.
//!
//! This crate owns everything that happens to a single interaction once it
//! has been received: decoding it into a typed value, answering it exactly
//! once, following up, and waiting for correlated component or modal events.
//!
//! ## Layers
//!
//! - **Model**: the wire types the pipeline reads ([`model`]) and the
//!   snowflake helpers ([`snowflake`]).
//! - **Envelope**: [`Interaction`] and its typed views ([`CommandInteraction`],
//!   [`ComponentInteraction`], [`ModalSubmitInteraction`], ...).
//! - **Response channel**: initial response, follow-ups and edits on
//!   [`ReplyableInteraction`], backed by an [`InteractionApi`] transport.
//! - **Event bus**: [`EventBus`] broadcasting [`ClientEvent`]s; awaits on
//!   interactions subscribe to it.
//!
//! ## Flow
//!
//! ```text
//! ┌───────────┐  decode  ┌─────────────┐  emit  ┌──────────┐
//! │  payload  │─────────▶│ Interaction │───────▶│ EventBus │──▶ waiters
//! └───────────┘          └─────────────┘        └──────────┘
//!                               │ respond
//!                               ▼
//!                        ┌────────────────┐
//!                        │ InteractionApi │
//!                        └────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use barry_core::prelude::*;
//!
//! async fn confirm(command: CommandInteraction) -> ResponseResult<()> {
//!     command.create_message("Are you sure?").await?;
//!
//!     let options = AwaitComponentOptions::new().custom_id("yes");
//!     match command.await_message_component(options).await? {
//!         Some(button) => button.edit_parent("Done.").await,
//!         None => Ok(()),
//!     }
//! }
//! ```

pub mod api;
pub mod capability;
pub mod error;
pub mod event;
pub mod interaction;
pub mod model;
pub mod snowflake;

pub use api::{BoxedApi, InteractionApi, ORIGINAL_MESSAGE};
pub use capability::{
    BoxedInteractionReceiver, InitialResponder, InteractionReceiver, ListenerHandle,
};
pub use error::{
    ApiError, ApiResult, DecodeError, DecodeResult, ResponseError, ResponseResult,
};
pub use event::{ClientEvent, EventBus, GatewayDispatch, INTERACTION_CREATE, WeakEventBus};
pub use interaction::{
    AutocompleteInteraction, AwaitComponentOptions, CommandInteraction, ComponentInteraction,
    DEFAULT_AWAIT_TIMEOUT, GuildInteraction, Interaction, InteractionContext, InteractionData,
    InteractionType, ModalSubmitInteraction, ReplyableInteraction, ResponseState,
    TypedInteraction, UserFilter,
};

/// Commonly used types.
pub mod prelude {
    pub use crate::api::{BoxedApi, InteractionApi};
    pub use crate::error::{ApiError, DecodeError, ResponseError, ResponseResult};
    pub use crate::event::{ClientEvent, EventBus};
    pub use crate::interaction::{
        AutocompleteInteraction, AwaitComponentOptions, CommandInteraction,
        ComponentInteraction, GuildInteraction, Interaction, ModalSubmitInteraction,
        ReplyableInteraction, TypedInteraction, UserFilter,
    };
    pub use crate::model::{
        Choice, FileUpload, Member, Message, MessageFlags, MessagePayload, ModalPayload,
        Permissions, User,
    };
}
