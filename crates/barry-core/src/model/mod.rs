//! Wire model for the parts of the Discord API the core consumes.
//!
//! Only the fields the interaction pipeline reads are typed; embeds,
//! components and other schema-heavy payloads stay as raw JSON.

pub mod channel;
pub mod command;
pub mod component;
pub mod payload;
pub mod permissions;
pub mod user;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use channel::{Attachment, Message, PartialChannel};
pub use command::{
    ApplicationCommandData, CommandDataOption, CommandType, EntityKind, OptionNode, OptionType,
    ResolvedData,
};
pub use component::{ComponentData, ComponentType, ModalSubmitData};
pub use payload::{
    CallbackType, Choice, FileUpload, InteractionResponse, MessageFlags, MessagePayload,
    ModalPayload,
};
pub use permissions::Permissions;
pub use user::{Member, Role, User};

/// An interaction exactly as delivered, before variant selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInteraction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub guild_locale: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub channel: Option<PartialChannel>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub app_permissions: Option<Permissions>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Cheap structural check used at transport boundaries: does this JSON value
/// look like an interaction at all?
pub fn is_interaction_shaped(value: &Value) -> bool {
    value.get("id").is_some_and(Value::is_string)
        && value.get("application_id").is_some_and(Value::is_string)
        && value.get("type").is_some_and(Value::is_u64)
        && value.get("token").is_some_and(Value::is_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interaction_shape() {
        assert!(is_interaction_shaped(&json!({
            "id": "1", "application_id": "2", "type": 1, "token": "t"
        })));
        assert!(!is_interaction_shaped(&json!({ "id": "1", "type": 1, "token": "t" })));
        assert!(!is_interaction_shaped(&json!({
            "id": "1", "application_id": "2", "type": "1", "token": "t"
        })));
        assert!(!is_interaction_shaped(&json!([])));
    }
}
