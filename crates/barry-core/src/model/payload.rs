//! Outbound payloads: messages, modals, autocomplete choices and the
//! interaction callback envelope.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

bitflags! {
    /// Message flags relevant to interaction responses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MessageFlags: u64 {
        const SUPPRESS_EMBEDS = 1 << 2;
        const EPHEMERAL = 1 << 6;
        const SUPPRESS_NOTIFICATIONS = 1 << 12;
    }
}

/// A file uploaded alongside a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Content of a message to create or edit.
///
/// Embeds and components are passed through as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<Value>,
    /// Attachment metadata; filled from `files` when encoding.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    #[serde(skip)]
    pub files: Vec<FileUpload>,
}

impl MessagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: Value) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn component(mut self, component: Value) -> Self {
        self.components.push(component);
        self
    }

    /// Replaces the components; an empty list removes existing ones on edit.
    pub fn components(mut self, components: Vec<Value>) -> Self {
        self.components = components;
        self
    }

    pub fn flags(mut self, flags: MessageFlags) -> Self {
        self.flags = Some(self.flags.unwrap_or_default() | flags.bits());
        self
    }

    /// Only the invoking user will see the message.
    pub fn ephemeral(self) -> Self {
        self.flags(MessageFlags::EPHEMERAL)
    }

    pub fn allowed_mentions(mut self, allowed_mentions: Value) -> Self {
        self.allowed_mentions = Some(allowed_mentions);
        self
    }

    pub fn file(mut self, file: FileUpload) -> Self {
        self.files.push(file);
        self
    }

    /// Serializes the payload, adding one attachment entry per file so the
    /// multipart `files[i]` parts are referenced from the JSON body.
    pub fn to_json(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| json!({}));
        if !self.files.is_empty() {
            let attachments: Vec<Value> = self
                .files
                .iter()
                .enumerate()
                .map(|(i, file)| json!({ "id": i, "filename": file.name }))
                .collect();
            value["attachments"] = Value::Array(attachments);
        }
        value
    }
}

impl From<&str> for MessagePayload {
    fn from(content: &str) -> Self {
        Self::new().content(content)
    }
}

impl From<String> for MessagePayload {
    fn from(content: String) -> Self {
        Self::new().content(content)
    }
}

/// A modal to show in response to an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalPayload {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<Value>,
}

impl ModalPayload {
    pub fn new(custom_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            title: title.into(),
            components: Vec::new(),
        }
    }

    pub fn component(mut self, component: Value) -> Self {
        self.components.push(component);
        self
    }
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: Value,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Interaction callback types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackType {
    Pong,
    ChannelMessageWithSource,
    DeferredChannelMessageWithSource,
    DeferredUpdateMessage,
    UpdateMessage,
    ApplicationCommandAutocompleteResult,
    Modal,
}

impl CallbackType {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Pong => 1,
            Self::ChannelMessageWithSource => 4,
            Self::DeferredChannelMessageWithSource => 5,
            Self::DeferredUpdateMessage => 6,
            Self::UpdateMessage => 7,
            Self::ApplicationCommandAutocompleteResult => 8,
            Self::Modal => 9,
        }
    }
}

/// The body of an initial interaction response, plus any files.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionResponse {
    pub kind: CallbackType,
    pub data: Option<Value>,
    pub files: Vec<FileUpload>,
}

impl InteractionResponse {
    fn new(kind: CallbackType, data: Option<Value>) -> Self {
        Self {
            kind,
            data,
            files: Vec::new(),
        }
    }

    fn with_message(kind: CallbackType, payload: MessagePayload) -> Self {
        let data = payload.to_json();
        Self {
            kind,
            data: Some(data),
            files: payload.files,
        }
    }

    pub fn pong() -> Self {
        Self::new(CallbackType::Pong, None)
    }

    pub fn message(payload: MessagePayload) -> Self {
        Self::with_message(CallbackType::ChannelMessageWithSource, payload)
    }

    pub fn deferred(flags: Option<MessageFlags>) -> Self {
        let data = flags.map(|f| json!({ "flags": f.bits() }));
        Self::new(CallbackType::DeferredChannelMessageWithSource, data)
    }

    pub fn deferred_update() -> Self {
        Self::new(CallbackType::DeferredUpdateMessage, None)
    }

    pub fn update(payload: MessagePayload) -> Self {
        Self::with_message(CallbackType::UpdateMessage, payload)
    }

    pub fn autocomplete(choices: Vec<Choice>) -> Self {
        Self::new(
            CallbackType::ApplicationCommandAutocompleteResult,
            Some(json!({ "choices": choices })),
        )
    }

    pub fn modal(payload: ModalPayload) -> Self {
        Self::new(CallbackType::Modal, serde_json::to_value(payload).ok())
    }

    /// The JSON body (`{type, data}`).
    pub fn body(&self) -> Value {
        let mut body = json!({ "type": self.kind.as_u8() });
        if let Some(data) = &self.data {
            body["data"] = data.clone();
        }
        body
    }
}
