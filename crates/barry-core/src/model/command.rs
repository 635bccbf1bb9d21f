//! Application command interaction data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::channel::{Attachment, Message, PartialChannel};
use super::user::{Member, Role, User};

/// The kind of an application command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CommandType {
    /// Slash command.
    ChatInput,
    /// Context-menu command on a user.
    User,
    /// Context-menu command on a message.
    Message,
    /// A type this version does not know about.
    Unknown(u8),
}

impl CommandType {
    /// Upper-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatInput => "CHAT_INPUT",
            Self::User => "USER",
            Self::Message => "MESSAGE",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for CommandType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::ChatInput,
            2 => Self::User,
            3 => Self::Message,
            other => Self::Unknown(other),
        }
    }
}

impl From<CommandType> for u8 {
    fn from(value: CommandType) -> Self {
        match value {
            CommandType::ChatInput => 1,
            CommandType::User => 2,
            CommandType::Message => 3,
            CommandType::Unknown(other) => other,
        }
    }
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum OptionType {
    Subcommand,
    SubcommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
    Unknown(u8),
}

impl OptionType {
    /// Returns the entity kind for options whose value is a snowflake into
    /// the resolved table.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            Self::User => Some(EntityKind::User),
            Self::Channel => Some(EntityKind::Channel),
            Self::Role => Some(EntityKind::Role),
            Self::Mentionable => Some(EntityKind::Mentionable),
            Self::Attachment => Some(EntityKind::Attachment),
            _ => None,
        }
    }
}

impl From<u8> for OptionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Subcommand,
            2 => Self::SubcommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            other => Self::Unknown(other),
        }
    }
}

impl From<OptionType> for u8 {
    fn from(value: OptionType) -> Self {
        match value {
            OptionType::Subcommand => 1,
            OptionType::SubcommandGroup => 2,
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::User => 6,
            OptionType::Channel => 7,
            OptionType::Role => 8,
            OptionType::Mentionable => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
            OptionType::Unknown(other) => other,
        }
    }
}

/// Option types whose value is looked up in [`ResolvedData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Channel,
    Role,
    Mentionable,
    Attachment,
}

/// One option node as received in an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandDataOption>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub focused: bool,
}

static NULL: Value = Value::Null;

/// A typed view of a [`CommandDataOption`].
#[derive(Debug, Clone, Copy)]
pub enum OptionNode<'a> {
    /// A subcommand or subcommand group wrapping further options.
    Branch {
        name: &'a str,
        group: bool,
        options: &'a [CommandDataOption],
    },
    /// A plain value (string, integer, number, boolean, ...).
    Scalar {
        name: &'a str,
        kind: OptionType,
        value: &'a Value,
        focused: bool,
    },
    /// A snowflake pointing into the resolved table.
    Entity {
        name: &'a str,
        kind: EntityKind,
        id: &'a str,
    },
}

impl CommandDataOption {
    /// Classifies this option.
    pub fn node(&self) -> OptionNode<'_> {
        match self.kind {
            OptionType::Subcommand | OptionType::SubcommandGroup => OptionNode::Branch {
                name: &self.name,
                group: self.kind == OptionType::SubcommandGroup,
                options: &self.options,
            },
            kind => {
                let value = self.value.as_ref().unwrap_or(&NULL);
                match (kind.entity_kind(), value.as_str(), self.focused) {
                    (Some(entity), Some(id), false) => OptionNode::Entity {
                        name: &self.name,
                        kind: entity,
                        id,
                    },
                    _ => OptionNode::Scalar {
                        name: &self.name,
                        kind,
                        value,
                        focused: self.focused,
                    },
                }
            }
        }
    }

    /// Returns `true` for subcommand and subcommand group nodes.
    pub fn is_branch(&self) -> bool {
        matches!(
            self.kind,
            OptionType::Subcommand | OptionType::SubcommandGroup
        )
    }
}

/// Entities referenced by an interaction, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default)]
    pub members: HashMap<String, Member>,
    #[serde(default)]
    pub roles: HashMap<String, Role>,
    #[serde(default)]
    pub channels: HashMap<String, PartialChannel>,
    #[serde(default)]
    pub messages: HashMap<String, Message>,
    #[serde(default)]
    pub attachments: HashMap<String, Attachment>,
}

impl ResolvedData {
    /// Returns the member with the given ID, with its `user` filled in from
    /// the resolved users when the member entry omits it.
    pub fn member(&self, id: &str) -> Option<Member> {
        let mut member = self.members.get(id)?.clone();
        if member.user.is_none() {
            member.user = self.users.get(id).cloned();
        }
        Some(member)
    }
}

/// Data of an application command or autocomplete interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationCommandData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CommandType,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub resolved: ResolvedData,
    #[serde(default)]
    pub target_id: Option<String>,
}

impl ApplicationCommandData {
    /// Names of the subcommand group and subcommand invoked, outermost first.
    pub fn subcommand_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut options = self.options.as_slice();
        while let Some(branch) = options.first().filter(|o| o.is_branch()) {
            path.push(branch.name.as_str());
            options = &branch.options;
        }
        path
    }

    /// The options of the innermost subcommand (or the top level when none).
    pub fn leaf_options(&self) -> &[CommandDataOption] {
        let mut options = self.options.as_slice();
        while let Some(branch) = options.first().filter(|o| o.is_branch()) {
            options = &branch.options;
        }
        options
    }

    /// The option the user is currently typing into (autocomplete only).
    pub fn focused_option(&self) -> Option<&CommandDataOption> {
        self.leaf_options().iter().find(|o| o.focused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested() -> ApplicationCommandData {
        serde_json::from_value(json!({
            "id": "1",
            "name": "config",
            "type": 1,
            "options": [{
                "name": "foo",
                "type": 2,
                "options": [{
                    "name": "bar",
                    "type": 1,
                    "options": [
                        { "name": "amount", "type": 4, "value": 5 },
                        { "name": "query", "type": 3, "value": "ab", "focused": true }
                    ]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_subcommand_path() {
        assert_eq!(nested().subcommand_path(), vec!["foo", "bar"]);
    }

    #[test]
    fn test_focused_option() {
        let data = nested();
        assert_eq!(data.focused_option().unwrap().name, "query");
        assert_eq!(data.leaf_options().len(), 2);
    }

    #[test]
    fn test_entity_node() {
        let option: CommandDataOption =
            serde_json::from_value(json!({ "name": "target", "type": 6, "value": "42" })).unwrap();
        assert!(matches!(
            option.node(),
            OptionNode::Entity { kind: EntityKind::User, id: "42", .. }
        ));
    }

    #[test]
    fn test_unknown_command_type_round_trips() {
        let kind: CommandType = serde_json::from_value(json!(9)).unwrap();
        assert_eq!(kind, CommandType::Unknown(9));
        assert_eq!(serde_json::to_value(kind).unwrap(), json!(9));
    }

    #[test]
    fn test_resolved_member_fills_user() {
        let resolved: ResolvedData = serde_json::from_value(json!({
            "users": { "42": { "id": "42", "username": "barry" } },
            "members": { "42": { "roles": [] } }
        }))
        .unwrap();
        let member = resolved.member("42").unwrap();
        assert_eq!(member.user.unwrap().username, "barry");
        assert!(resolved.member("7").is_none());
    }
}
