//! Channels, messages and attachments.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::permissions::Permissions;
use super::user::User;
use crate::snowflake;

/// The partial channel attached to interactions and resolved data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// A message as returned by the API.
///
/// Embeds and components are kept as raw JSON; their schema is not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub embeds: Vec<Value>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub flags: Option<u64>,
}

impl Message {
    /// When the message was created, derived from its ID.
    pub fn created_at(&self) -> Option<SystemTime> {
        snowflake::created_at(&self.id)
    }
}
