//! The response channel of an interaction.
//!
//! Every interaction accepts exactly one initial response. The slot is
//! claimed under the lifecycle lock before anything is sent, so two
//! concurrent attempts can never both go out; if sending fails the claim is
//! released again.

use tracing::debug;

use super::{Interaction, ReplyableInteraction};
use crate::api::ORIGINAL_MESSAGE;
use crate::error::{ApiResult, ResponseError, ResponseResult};
use crate::model::{InteractionResponse, Message, MessageFlags, MessagePayload, ModalPayload};

/// Where an interaction is in its response lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseState {
    /// Nothing sent yet.
    #[default]
    Unacknowledged,
    /// A deferred acknowledgement was sent; the response will follow.
    Deferred,
    /// A message (or message update) was sent as the initial response.
    Responded,
    /// A modal was shown. There is no original message to edit.
    ModalShown,
}

#[derive(Debug, Default)]
pub(super) struct Lifecycle {
    state: ResponseState,
    original_message_id: Option<String>,
}

impl Lifecycle {
    fn has_initial_response(&self) -> bool {
        matches!(
            self.state,
            ResponseState::Deferred | ResponseState::Responded
        ) || self.original_message_id.is_some()
    }
}

impl Interaction {
    pub fn response_state(&self) -> ResponseState {
        self.lifecycle.lock().state
    }

    /// Whether the initial response slot has been used.
    pub fn is_acknowledged(&self) -> bool {
        self.response_state() != ResponseState::Unacknowledged
    }

    /// Whether an original message exists (or will exist) to edit or attach
    /// components to.
    pub fn has_initial_response(&self) -> bool {
        self.lifecycle.lock().has_initial_response()
    }

    /// ID of the original response message, once known.
    pub fn original_message_id(&self) -> Option<String> {
        self.lifecycle.lock().original_message_id.clone()
    }

    /// Claims the initial response slot.
    pub(super) fn claim(&self, next: ResponseState) -> ResponseResult<()> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state != ResponseState::Unacknowledged {
            return Err(ResponseError::AlreadyAcknowledged);
        }
        lifecycle.state = next;
        Ok(())
    }

    /// Sends an initial response whose slot was claimed with [`claim`].
    ///
    /// [`claim`]: Self::claim
    pub(super) async fn finish_initial(
        &self,
        response: InteractionResponse,
        original_message_id: Option<String>,
    ) -> ResponseResult<()> {
        let kind = response.kind;
        match self.deliver(response).await {
            Ok(()) => {
                debug!(interaction_id = %self.id, callback = ?kind, "Sent initial response");
                if let Some(id) = original_message_id {
                    self.lifecycle.lock().original_message_id = Some(id);
                }
                Ok(())
            }
            Err(err) => {
                self.lifecycle.lock().state = ResponseState::Unacknowledged;
                Err(err.into())
            }
        }
    }

    /// Claims the slot and sends `response`.
    pub(super) async fn send_initial(
        &self,
        response: InteractionResponse,
        next: ResponseState,
        original_message_id: Option<String>,
    ) -> ResponseResult<()> {
        self.claim(next)?;
        self.finish_initial(response, original_message_id).await
    }

    /// Writes to the inline responder when the transport is waiting on one,
    /// otherwise posts the callback.
    async fn deliver(&self, response: InteractionResponse) -> ApiResult<()> {
        let responder = self.responder.lock().take();
        let response = match responder {
            Some(responder) => match responder.send(response) {
                Ok(()) => return Ok(()),
                Err(response) => {
                    debug!(interaction_id = %self.id, "Inline responder closed, falling back to callback");
                    response
                }
            },
            None => response,
        };
        self.ctx
            .api()
            .create_interaction_response(&self.id, &self.token, response)
            .await
    }

    fn remember_original(&self, message: &Message) {
        self.lifecycle.lock().original_message_id = Some(message.id.clone());
    }
}

impl ReplyableInteraction {
    /// Sends a message.
    ///
    /// The first call is the initial response and returns `None`; once the
    /// interaction is acknowledged this sends a follow-up message instead and
    /// returns it.
    pub async fn create_message(
        &self,
        payload: impl Into<MessagePayload>,
    ) -> ResponseResult<Option<Message>> {
        let payload = payload.into();
        if self.claim(ResponseState::Responded).is_ok() {
            self.finish_initial(InteractionResponse::message(payload), None)
                .await?;
            return Ok(None);
        }
        self.create_followup_message(payload).await.map(Some)
    }

    /// Acknowledges the interaction; the user sees a loading state until the
    /// original message is edited.
    pub async fn defer(&self, flags: Option<MessageFlags>) -> ResponseResult<()> {
        self.send_initial(
            InteractionResponse::deferred(flags),
            ResponseState::Deferred,
            None,
        )
        .await
    }

    /// Shows a modal as the initial response.
    pub async fn create_modal(&self, modal: ModalPayload) -> ResponseResult<()> {
        self.send_initial(
            InteractionResponse::modal(modal),
            ResponseState::ModalShown,
            None,
        )
        .await
    }

    pub async fn create_followup_message(
        &self,
        payload: impl Into<MessagePayload>,
    ) -> ResponseResult<Message> {
        let message = self
            .ctx
            .api()
            .create_followup_message(&self.application_id, &self.token, payload.into())
            .await?;
        Ok(message)
    }

    pub async fn get_followup_message(&self, message_id: &str) -> ResponseResult<Message> {
        let message = self
            .ctx
            .api()
            .get_followup_message(&self.application_id, &self.token, message_id)
            .await?;
        Ok(message)
    }

    pub async fn edit_followup_message(
        &self,
        message_id: &str,
        payload: impl Into<MessagePayload>,
    ) -> ResponseResult<Message> {
        let message = self
            .ctx
            .api()
            .edit_followup_message(&self.application_id, &self.token, message_id, payload.into())
            .await?;
        Ok(message)
    }

    pub async fn delete_followup_message(&self, message_id: &str) -> ResponseResult<()> {
        self.ctx
            .api()
            .delete_followup_message(&self.application_id, &self.token, message_id)
            .await?;
        Ok(())
    }

    /// Fetches the original response and remembers its ID.
    pub async fn get_original_message(&self) -> ResponseResult<Message> {
        let message = self.get_followup_message(ORIGINAL_MESSAGE).await?;
        self.remember_original(&message);
        Ok(message)
    }

    pub async fn edit_original_message(
        &self,
        payload: impl Into<MessagePayload>,
    ) -> ResponseResult<Message> {
        let message = self
            .edit_followup_message(ORIGINAL_MESSAGE, payload)
            .await?;
        self.remember_original(&message);
        Ok(message)
    }

    pub async fn delete_original_message(&self) -> ResponseResult<()> {
        self.delete_followup_message(ORIGINAL_MESSAGE).await
    }
}
