//! Awaiting follow-up interactions.
//!
//! A waiter is a short-lived interaction subscription on the event bus raced
//! against a single timer. Whichever completes first wins and the other is dropped,
//! which also drops the subscription.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use super::{ComponentInteraction, ModalSubmitInteraction, ReplyableInteraction};
use crate::error::{ResponseError, ResponseResult};

/// Default time to wait for a component or modal submit.
pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Which users a component waiter accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserFilter {
    /// Only the user who invoked the awaiting interaction.
    #[default]
    Invoker,
    /// Anyone.
    Any,
    /// Only this user ID.
    Only(String),
}

/// Options for [`ReplyableInteraction::await_message_component`].
#[derive(Debug, Clone)]
pub struct AwaitComponentOptions {
    /// Accepted custom IDs; empty accepts any.
    pub custom_ids: Vec<String>,
    /// Message the component must be attached to; defaults to the original
    /// response.
    pub message_id: Option<String>,
    pub timeout: Duration,
    pub user: UserFilter,
}

impl Default for AwaitComponentOptions {
    fn default() -> Self {
        Self {
            custom_ids: Vec::new(),
            message_id: None,
            timeout: DEFAULT_AWAIT_TIMEOUT,
            user: UserFilter::Invoker,
        }
    }
}

impl AwaitComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_ids.push(custom_id.into());
        self
    }

    pub fn custom_ids<I, S>(mut self, custom_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_ids.extend(custom_ids.into_iter().map(Into::into));
        self
    }

    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user(mut self, user: UserFilter) -> Self {
        self.user = user;
        self
    }

    /// Accept components from anyone.
    pub fn any_user(self) -> Self {
        self.user(UserFilter::Any)
    }

    fn accepts_custom_id(&self, custom_id: &str) -> bool {
        self.custom_ids.is_empty() || self.custom_ids.iter().any(|id| id == custom_id)
    }
}

impl ReplyableInteraction {
    /// Waits for a component on this interaction's message.
    ///
    /// Resolves with the first matching component, or `None` on timeout.
    /// Fails immediately when there is neither an explicit message ID nor an
    /// initial response the component could be attached to.
    pub async fn await_message_component(
        &self,
        options: AwaitComponentOptions,
    ) -> ResponseResult<Option<ComponentInteraction>> {
        let mut target = options
            .message_id
            .clone()
            .or_else(|| self.original_message_id());
        if target.is_none() && !self.has_initial_response() {
            return Err(ResponseError::NoInitialResponse);
        }

        let Some(mut rx) = self.ctx().events.subscribe_interactions() else {
            debug!(interaction_id = %self.id(), "Event bus closed, nothing to await");
            return Ok(None);
        };

        let user_id = match &options.user {
            UserFilter::Invoker => Some(self.user().id.clone()),
            UserFilter::Any => None,
            UserFilter::Only(id) => Some(id.clone()),
        };

        let deadline = tokio::time::sleep(options.timeout);
        tokio::pin!(deadline);

        loop {
            let event = tokio::select! {
                _ = &mut deadline => {
                    debug!(interaction_id = %self.id(), "Timed out waiting for component");
                    return Ok(None);
                }
                event = rx.recv() => event,
            };

            let interaction = match event {
                Ok(interaction) => interaction,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(interaction_id = %self.id(), skipped, "Component waiter lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => return Ok(None),
            };

            let Some(component) = ComponentInteraction::from_interaction(interaction) else {
                continue;
            };
            if !options.accepts_custom_id(component.custom_id()) {
                continue;
            }
            if user_id.as_ref().is_some_and(|id| component.user().id != *id) {
                continue;
            }

            let target_id = match &target {
                Some(id) => id.clone(),
                None => {
                    let original = tokio::select! {
                        _ = &mut deadline => {
                            debug!(interaction_id = %self.id(), "Timed out fetching the original response");
                            return Ok(None);
                        }
                        original = self.get_original_message() => original?,
                    };
                    target = Some(original.id.clone());
                    original.id
                }
            };
            if component.parent_message().id == target_id {
                return Ok(Some(component));
            }
        }
    }

    /// Waits for the modal with `custom_id` to be submitted.
    ///
    /// Resolves with `None` on timeout.
    pub async fn await_modal_submit(
        &self,
        custom_id: impl Into<String>,
        timeout: Duration,
    ) -> Option<ModalSubmitInteraction> {
        let custom_id = custom_id.into();
        let mut rx = self.ctx().events.subscribe_interactions()?;

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            let event = tokio::select! {
                _ = &mut deadline => {
                    debug!(interaction_id = %self.id(), %custom_id, "Timed out waiting for modal");
                    return None;
                }
                event = rx.recv() => event,
            };

            match event {
                Ok(interaction) => {
                    if let Some(modal) = ModalSubmitInteraction::from_interaction(interaction)
                        && modal.custom_id() == custom_id
                    {
                        return Some(modal);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(interaction_id = %self.id(), skipped, "Modal waiter lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
