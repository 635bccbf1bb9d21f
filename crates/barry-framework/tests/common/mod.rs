#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use barry_core::model::{CallbackType, InteractionResponse, Message, MessagePayload};
use barry_core::{ApiResult, BoxedApi, InteractionApi};
use barry_framework::{Client, Command};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const APP_ID: &str = "100";
pub const GUILD_ID: &str = "200";
pub const USER_ID: &str = "400";
pub const ORIGINAL_ID: &str = "500";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Callback(CallbackType),
    Followup(Option<String>),
    GetMessage(String),
    GlobalCommands(Vec<String>),
    GuildCommands(String, Vec<String>),
}

#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

fn names(commands: &[Value]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| c["name"].as_str().map(str::to_string))
        .collect()
}

fn message(id: &str) -> Message {
    serde_json::from_value(json!({ "id": id, "channel_id": "300" })).unwrap()
}

#[async_trait]
impl InteractionApi for MockApi {
    async fn create_interaction_response(
        &self,
        _interaction_id: &str,
        _token: &str,
        response: InteractionResponse,
    ) -> ApiResult<()> {
        self.record(Call::Callback(response.kind));
        Ok(())
    }

    async fn create_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        payload: MessagePayload,
    ) -> ApiResult<Message> {
        self.record(Call::Followup(payload.content));
        Ok(message("600"))
    }

    async fn get_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        message_id: &str,
    ) -> ApiResult<Message> {
        self.record(Call::GetMessage(message_id.to_string()));
        Ok(message(ORIGINAL_ID))
    }

    async fn edit_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        _message_id: &str,
        _payload: MessagePayload,
    ) -> ApiResult<Message> {
        Ok(message(ORIGINAL_ID))
    }

    async fn delete_followup_message(
        &self,
        _application_id: &str,
        _token: &str,
        _message_id: &str,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn bulk_overwrite_global_commands(
        &self,
        _application_id: &str,
        commands: Vec<Value>,
    ) -> ApiResult<()> {
        self.record(Call::GlobalCommands(names(&commands)));
        Ok(())
    }

    async fn bulk_overwrite_guild_commands(
        &self,
        _application_id: &str,
        guild_id: &str,
        commands: Vec<Value>,
    ) -> ApiResult<()> {
        self.record(Call::GuildCommands(guild_id.to_string(), names(&commands)));
        Ok(())
    }
}

pub fn client(commands: Vec<Command>) -> (Arc<MockApi>, Client) {
    let api = Arc::new(MockApi::default());
    let boxed: BoxedApi = api.clone();
    let mut builder = Client::builder(boxed, APP_ID);
    for command in commands {
        builder = builder.command(command);
    }
    (api, builder.build())
}

fn base(id: &str, kind: u8, user_id: &str) -> Value {
    json!({
        "id": id,
        "application_id": APP_ID,
        "type": kind,
        "token": format!("token-{id}"),
        "guild_id": GUILD_ID,
        "guild_locale": "en-US",
        "channel": { "id": "300", "type": 0 },
        "member": {
            "user": { "id": user_id, "username": "barry" },
            "roles": []
        },
        "app_permissions": "2048"
    })
}

/// A chat-input interaction; `data` extends the command data.
pub fn chat_input(id: &str, name: &str, options: Value) -> Value {
    let mut payload = base(id, 2, USER_ID);
    payload["data"] = json!({ "id": "1", "name": name, "type": 1, "options": options });
    payload
}

pub fn context_menu(id: &str, name: &str, kind: u8, target_id: &str, resolved: Value) -> Value {
    let mut payload = base(id, 2, USER_ID);
    payload["data"] = json!({
        "id": "1", "name": name, "type": kind,
        "target_id": target_id, "resolved": resolved
    });
    payload
}

pub fn component(id: &str, custom_id: &str, message_id: &str, user_id: &str) -> Value {
    let mut payload = base(id, 3, user_id);
    payload["message"] = json!({ "id": message_id, "channel_id": "300" });
    payload["data"] = json!({ "custom_id": custom_id, "component_type": 2 });
    payload
}

pub fn autocomplete(id: &str, name: &str, focused: &str, input: &str) -> Value {
    let mut payload = base(id, 4, USER_ID);
    payload["data"] = json!({
        "id": "1", "name": name, "type": 1,
        "options": [{ "name": focused, "type": 3, "value": input, "focused": true }]
    });
    payload
}

/// Marks the invoked command as registered in `guild_id`.
pub fn registered_in(mut payload: Value, guild_id: &str) -> Value {
    payload["data"]["guild_id"] = json!(guild_id);
    payload
}

pub fn dispatch(payload: Value) -> barry_core::GatewayDispatch {
    barry_core::GatewayDispatch::new(barry_core::INTERACTION_CREATE, payload)
}
