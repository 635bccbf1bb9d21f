//! Fixtures shared by the interaction tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::{Interaction, InteractionContext};
use crate::api::{InteractionApi, ORIGINAL_MESSAGE};
use crate::error::{ApiError, ApiResult};
use crate::event::EventBus;
use crate::model::{CallbackType, InteractionResponse, Message, MessagePayload};

pub const APP_ID: &str = "100";
pub const GUILD_ID: &str = "200";
pub const USER_ID: &str = "400";
pub const ORIGINAL_ID: &str = "500";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Callback(CallbackType),
    CreateFollowup(Option<String>),
    GetMessage(String),
    EditMessage(String),
    DeleteMessage(String),
}

/// Records every call and answers with canned messages.
#[derive(Default)]
pub struct MockApi {
    pub calls: Mutex<Vec<Call>>,
    pub fail_callbacks: AtomicBool,
    /// Delay before message fetches answer.
    pub get_delay: Mutex<Duration>,
}

impl MockApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn callbacks(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Callback(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl InteractionApi for MockApi {
    async fn create_interaction_response(
        &self,
        _interaction_id: &str,
        _token: &str,
        response: InteractionResponse,
    ) -> ApiResult<()> {
        if self.fail_callbacks.load(Ordering::SeqCst) {
            return Err(ApiError::Request("connection reset".into()));
        }
        self.record(Call::Callback(response.kind));
        Ok(())
    }

    async fn create_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        payload: MessagePayload,
    ) -> ApiResult<Message> {
        let n = self.calls.lock().len();
        self.record(Call::CreateFollowup(payload.content));
        Ok(message(&format!("followup-{n}")))
    }

    async fn get_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        message_id: &str,
    ) -> ApiResult<Message> {
        self.record(Call::GetMessage(message_id.to_string()));
        let delay = *self.get_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(message(resolve_id(message_id)))
    }

    async fn edit_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        message_id: &str,
        _payload: MessagePayload,
    ) -> ApiResult<Message> {
        self.record(Call::EditMessage(message_id.to_string()));
        Ok(message(resolve_id(message_id)))
    }

    async fn delete_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        message_id: &str,
    ) -> ApiResult<()> {
        self.record(Call::DeleteMessage(message_id.to_string()));
        Ok(())
    }

    async fn bulk_overwrite_global_commands(
        &self,
        _application_id: &str,
        _commands: Vec<Value>,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn bulk_overwrite_guild_commands(
        &self,
        _application_id: &str,
        _guild_id: &str,
        _commands: Vec<Value>,
    ) -> ApiResult<()> {
        Ok(())
    }
}

fn resolve_id(message_id: &str) -> &str {
    if message_id == ORIGINAL_MESSAGE {
        ORIGINAL_ID
    } else {
        message_id
    }
}

pub fn message(id: &str) -> Message {
    serde_json::from_value(json!({ "id": id, "channel_id": "300" })).unwrap()
}

pub fn detached_ctx() -> InteractionContext {
    InteractionContext::detached(Arc::new(MockApi::default()))
}

pub fn decode(payload: Value) -> Interaction {
    Interaction::from_value(payload, detached_ctx()).unwrap()
}

/// A mock transport, a bus and a context bound to both.
pub fn harness() -> (Arc<MockApi>, EventBus, InteractionContext) {
    let api = Arc::new(MockApi::default());
    let bus = EventBus::default();
    let ctx = InteractionContext::new(api.clone(), &bus);
    (api, bus, ctx)
}

fn base(id: &str, kind: u8, user_id: &str) -> Value {
    json!({
        "id": id,
        "application_id": APP_ID,
        "type": kind,
        "token": format!("token-{id}"),
        "guild_id": GUILD_ID,
        "guild_locale": "en-US",
        "locale": "en-GB",
        "channel": { "id": "300", "type": 0 },
        "member": {
            "user": { "id": user_id, "username": "barry" },
            "roles": [],
            "permissions": "8"
        },
        "app_permissions": "2048"
    })
}

pub fn command_payload(name: &str, options: Value) -> Value {
    let mut payload = base("1000", 2, USER_ID);
    payload["data"] = json!({ "id": "1", "name": name, "type": 1, "options": options });
    payload
}

pub fn component_payload(custom_id: &str, message_id: &str, user_id: &str) -> Value {
    let mut payload = base("2000", 3, user_id);
    payload["message"] = json!({ "id": message_id, "channel_id": "300" });
    payload["data"] = json!({ "custom_id": custom_id, "component_type": 2 });
    payload
}

pub fn modal_payload(custom_id: &str) -> Value {
    let mut payload = base("3000", 5, USER_ID);
    payload["data"] = json!({
        "custom_id": custom_id,
        "components": [{
            "type": 1,
            "components": [{ "type": 4, "custom_id": "body", "value": "great bot" }]
        }]
    });
    payload
}

pub fn autocomplete_payload() -> Value {
    let mut payload = base("4000", 4, USER_ID);
    payload["data"] = json!({
        "id": "1",
        "name": "convert",
        "type": 1,
        "options": [{ "name": "unit", "type": 3, "value": "me", "focused": true }]
    });
    payload
}
