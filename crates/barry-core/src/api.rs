//! The transport collaborator used to answer interactions.
//!
//! [`InteractionApi`] is the only way the core talks to Discord's REST API.
//! `barry-transport` provides the HTTP implementation; tests provide mocks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;
use crate::model::{InteractionResponse, Message, MessagePayload};

/// Message ID addressing an interaction's initial response.
pub const ORIGINAL_MESSAGE: &str = "@original";

/// REST operations an interaction needs.
///
/// Follow-up operations are addressed by the application ID and the
/// interaction token; `message_id` may be [`ORIGINAL_MESSAGE`].
#[async_trait]
pub trait InteractionApi: Send + Sync + 'static {
    /// `POST /interactions/{id}/{token}/callback`.
    async fn create_interaction_response(
        &self,
        interaction_id: &str,
        token: &str,
        response: InteractionResponse,
    ) -> ApiResult<()>;

    /// `POST /webhooks/{application_id}/{token}`.
    async fn create_followup_message(
        &self,
        application_id: &str,
        token: &str,
        payload: MessagePayload,
    ) -> ApiResult<Message>;

    /// `GET /webhooks/{application_id}/{token}/messages/{message_id}`.
    async fn get_followup_message(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
    ) -> ApiResult<Message>;

    /// `PATCH /webhooks/{application_id}/{token}/messages/{message_id}`.
    async fn edit_followup_message(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
        payload: MessagePayload,
    ) -> ApiResult<Message>;

    /// `DELETE /webhooks/{application_id}/{token}/messages/{message_id}`.
    async fn delete_followup_message(
        &self,
        application_id: &str,
        token: &str,
        message_id: &str,
    ) -> ApiResult<()>;

    /// `PUT /applications/{application_id}/commands`.
    async fn bulk_overwrite_global_commands(
        &self,
        application_id: &str,
        commands: Vec<Value>,
    ) -> ApiResult<()>;

    /// `PUT /applications/{application_id}/guilds/{guild_id}/commands`.
    async fn bulk_overwrite_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: Vec<Value>,
    ) -> ApiResult<()>;
}

/// A shared transport handle.
pub type BoxedApi = Arc<dyn InteractionApi>;
