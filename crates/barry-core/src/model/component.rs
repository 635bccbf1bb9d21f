//! Message component and modal submit data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::command::ResolvedData;

/// The kind of a message component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ComponentType {
    ActionRow,
    Button,
    StringSelect,
    TextInput,
    UserSelect,
    RoleSelect,
    MentionableSelect,
    ChannelSelect,
    Unknown(u8),
}

impl From<u8> for ComponentType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::ActionRow,
            2 => Self::Button,
            3 => Self::StringSelect,
            4 => Self::TextInput,
            5 => Self::UserSelect,
            6 => Self::RoleSelect,
            7 => Self::MentionableSelect,
            8 => Self::ChannelSelect,
            other => Self::Unknown(other),
        }
    }
}

impl From<ComponentType> for u8 {
    fn from(value: ComponentType) -> Self {
        match value {
            ComponentType::ActionRow => 1,
            ComponentType::Button => 2,
            ComponentType::StringSelect => 3,
            ComponentType::TextInput => 4,
            ComponentType::UserSelect => 5,
            ComponentType::RoleSelect => 6,
            ComponentType::MentionableSelect => 7,
            ComponentType::ChannelSelect => 8,
            ComponentType::Unknown(other) => other,
        }
    }
}

/// Data of a message component interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: ComponentType,
    /// Selected values, for select menus.
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub resolved: ResolvedData,
}

impl ComponentData {
    /// Returns `true` for any of the select menu types.
    pub fn is_select(&self) -> bool {
        matches!(
            self.component_type,
            ComponentType::StringSelect
                | ComponentType::UserSelect
                | ComponentType::RoleSelect
                | ComponentType::MentionableSelect
                | ComponentType::ChannelSelect
        )
    }
}

/// Data of a modal submit interaction, with the submitted fields flattened
/// into a map keyed by each field's custom ID.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawModalSubmitData")]
pub struct ModalSubmitData {
    pub custom_id: String,
    pub values: HashMap<String, String>,
}

impl ModalSubmitData {
    /// Returns the submitted value of a field.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.values.get(custom_id).map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawModalSubmitData {
    custom_id: String,
    #[serde(default)]
    components: Vec<Value>,
}

impl From<RawModalSubmitData> for ModalSubmitData {
    fn from(raw: RawModalSubmitData) -> Self {
        let mut values = HashMap::new();
        for component in &raw.components {
            collect_field_values(component, &mut values);
        }
        Self {
            custom_id: raw.custom_id,
            values,
        }
    }
}

/// Walks action rows and labels down to the text inputs.
fn collect_field_values(component: &Value, out: &mut HashMap<String, String>) {
    if let (Some(id), Some(value)) = (
        component.get("custom_id").and_then(Value::as_str),
        component.get("value").and_then(Value::as_str),
    ) {
        out.insert(id.to_string(), value.to_string());
    }
    if let Some(children) = component.get("components").and_then(Value::as_array) {
        for child in children {
            collect_field_values(child, out);
        }
    }
    if let Some(child) = component.get("component") {
        collect_field_values(child, out);
    }
}
