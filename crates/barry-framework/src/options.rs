//! Option resolution.
//!
//! The option tree of a chat-input interaction is flattened into one map:
//! subcommand and group nodes contribute their children, scalars are copied
//! and entity options are replaced by the entity from the interaction's
//! resolved data.

use std::collections::HashMap;

use barry_core::model::{
    ApplicationCommandData, Attachment, CommandDataOption, EntityKind, Member, OptionNode,
    OptionType, PartialChannel, ResolvedData, Role, User,
};
use serde_json::Value;
use tracing::warn;

use crate::command::Command;
use crate::error::{CommandError, CommandResult};

/// A resolved option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(User),
    /// A user option declared to want the guild member.
    Member(Member),
    Channel(PartialChannel),
    Role(Role),
    Mentionable(Mentionable),
    Attachment(Attachment),
}

/// A mentionable option: a user or a role.
#[derive(Debug, Clone, PartialEq)]
pub enum Mentionable {
    User(User),
    Role(Role),
}

/// Options of one invocation, keyed by option name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOptions {
    values: HashMap<String, OptionValue>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Number options; integers are widened.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            OptionValue::Number(value) => Some(*value),
            OptionValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// The user of a user, member or mentionable option.
    pub fn user(&self, name: &str) -> Option<&User> {
        match self.get(name)? {
            OptionValue::User(user) => Some(user),
            OptionValue::Member(member) => member.user.as_ref(),
            OptionValue::Mentionable(Mentionable::User(user)) => Some(user),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        match self.get(name)? {
            OptionValue::Member(member) => Some(member),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<&PartialChannel> {
        match self.get(name)? {
            OptionValue::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    /// The role of a role or mentionable option.
    pub fn role(&self, name: &str) -> Option<&Role> {
        match self.get(name)? {
            OptionValue::Role(role) => Some(role),
            OptionValue::Mentionable(Mentionable::Role(role)) => Some(role),
            _ => None,
        }
    }

    pub fn mentionable(&self, name: &str) -> Option<&Mentionable> {
        match self.get(name)? {
            OptionValue::Mentionable(mentionable) => Some(mentionable),
            _ => None,
        }
    }

    pub fn attachment(&self, name: &str) -> Option<&Attachment> {
        match self.get(name)? {
            OptionValue::Attachment(attachment) => Some(attachment),
            _ => None,
        }
    }
}

/// Flattens the options of `data` against the leaf definition `command`.
pub fn resolve_options(
    data: &ApplicationCommandData,
    command: &Command,
) -> CommandResult<ResolvedOptions> {
    let mut resolver = OptionResolver {
        resolved: &data.resolved,
        command,
        values: HashMap::new(),
    };
    resolver.visit(&data.options)?;
    Ok(ResolvedOptions {
        values: resolver.values,
    })
}

struct OptionResolver<'a> {
    resolved: &'a ResolvedData,
    command: &'a Command,
    values: HashMap<String, OptionValue>,
}

impl OptionResolver<'_> {
    fn visit(&mut self, options: &[CommandDataOption]) -> CommandResult<()> {
        for option in options {
            match option.node() {
                OptionNode::Branch { options, .. } => self.visit(options)?,
                OptionNode::Scalar {
                    name, kind, value, ..
                } => self.visit_scalar(name, kind, value),
                OptionNode::Entity { name, kind, id } => self.visit_entity(name, kind, id)?,
            }
        }
        Ok(())
    }

    fn visit_scalar(&mut self, name: &str, kind: OptionType, value: &Value) {
        let resolved = match kind {
            OptionType::Integer => value.as_i64().map(OptionValue::Integer),
            OptionType::Number => value.as_f64().map(OptionValue::Number),
            OptionType::Boolean => value.as_bool().map(OptionValue::Boolean),
            // Strings, and partial input of focused entity options.
            _ => value.as_str().map(|s| OptionValue::String(s.to_string())),
        };
        match resolved {
            Some(resolved) => {
                self.values.insert(name.to_string(), resolved);
            }
            None => warn!(option = name, ?kind, %value, "Skipping option with unexpected value"),
        }
    }

    fn visit_entity(&mut self, name: &str, kind: EntityKind, id: &str) -> CommandResult<()> {
        let unresolved = |kind: &'static str| CommandError::UnresolvedOption {
            option: name.to_string(),
            kind,
        };
        let value = match kind {
            EntityKind::User if self.wants_member(name) => {
                let member = self
                    .resolved
                    .member(id)
                    .ok_or_else(|| CommandError::MissingMember {
                        option: name.to_string(),
                    })?;
                OptionValue::Member(member)
            }
            EntityKind::User => {
                OptionValue::User(self.resolved.users.get(id).cloned().ok_or_else(|| unresolved("user"))?)
            }
            EntityKind::Channel => OptionValue::Channel(
                self.resolved
                    .channels
                    .get(id)
                    .cloned()
                    .ok_or_else(|| unresolved("channel"))?,
            ),
            EntityKind::Role => {
                OptionValue::Role(self.resolved.roles.get(id).cloned().ok_or_else(|| unresolved("role"))?)
            }
            EntityKind::Attachment => OptionValue::Attachment(
                self.resolved
                    .attachments
                    .get(id)
                    .cloned()
                    .ok_or_else(|| unresolved("attachment"))?,
            ),
            EntityKind::Mentionable => {
                let mentionable = match self.resolved.users.get(id) {
                    Some(user) => Mentionable::User(user.clone()),
                    None => Mentionable::Role(
                        self.resolved
                            .roles
                            .get(id)
                            .cloned()
                            .ok_or_else(|| unresolved("mentionable"))?,
                    ),
                };
                OptionValue::Mentionable(mentionable)
            }
        };
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    fn wants_member(&self, name: &str) -> bool {
        self.command
            .option_definition(name)
            .is_some_and(|o| o.wants_member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::OptionDefinition;
    use serde_json::json;

    fn data(options: Value, resolved: Value) -> ApplicationCommandData {
        serde_json::from_value(json!({
            "id": "1", "name": "profile", "type": 1,
            "options": options, "resolved": resolved
        }))
        .unwrap()
    }

    #[test]
    fn test_scalars_and_branches_flatten() {
        let data = data(
            json!([{
                "name": "edit", "type": 1,
                "options": [
                    { "name": "bio", "type": 3, "value": "hello" },
                    { "name": "age", "type": 4, "value": 30 },
                    { "name": "rate", "type": 10, "value": 2.5 },
                    { "name": "public", "type": 5, "value": true }
                ]
            }]),
            json!({}),
        );

        let options = resolve_options(&data, &Command::chat_input("edit", "Edit")).unwrap();
        assert_eq!(options.len(), 4);
        assert_eq!(options.string("bio"), Some("hello"));
        assert_eq!(options.integer("age"), Some(30));
        assert_eq!(options.number("age"), Some(30.0));
        assert_eq!(options.number("rate"), Some(2.5));
        assert_eq!(options.boolean("public"), Some(true));
        assert!(!options.contains("edit"));
    }

    #[test]
    fn test_entities_substituted_from_resolved() {
        let data = data(
            json!([
                { "name": "who", "type": 6, "value": "7" },
                { "name": "where", "type": 7, "value": "8" },
                { "name": "ping", "type": 9, "value": "9" }
            ]),
            json!({
                "users": { "7": { "id": "7", "username": "ana" } },
                "channels": { "8": { "id": "8", "type": 0, "name": "general" } },
                "roles": { "9": { "id": "9", "name": "mods", "permissions": "0" } }
            }),
        );

        let options = resolve_options(&data, &Command::chat_input("x", "y")).unwrap();
        assert_eq!(options.user("who").unwrap().username, "ana");
        assert_eq!(options.channel("where").unwrap().name.as_deref(), Some("general"));
        assert_eq!(options.role("ping").unwrap().name, "mods");
        assert!(options.member("who").is_none());
    }

    #[test]
    fn test_member_option_resolves_member() {
        let data = data(
            json!([{ "name": "who", "type": 6, "value": "7" }]),
            json!({
                "users": { "7": { "id": "7", "username": "ana" } },
                "members": { "7": { "nick": "Ana", "roles": [] } }
            }),
        );
        let command = Command::chat_input("x", "y").option(OptionDefinition::member("who", "Who"));

        let options = resolve_options(&data, &command).unwrap();
        let member = options.member("who").unwrap();
        assert_eq!(member.nick.as_deref(), Some("Ana"));
        assert_eq!(options.user("who").unwrap().id, "7");
    }

    #[test]
    fn test_missing_member_is_hard_error() {
        let data = data(
            json!([{ "name": "who", "type": 6, "value": "7" }]),
            json!({ "users": { "7": { "id": "7", "username": "ana" } } }),
        );
        let command = Command::chat_input("x", "y").option(OptionDefinition::member("who", "Who"));

        let err = resolve_options(&data, &command).unwrap_err();
        assert!(matches!(err, CommandError::MissingMember { ref option } if option == "who"));
        assert!(!err.is_validation());
    }
}
