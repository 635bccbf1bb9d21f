//! The command registry.
//!
//! Commands are stored under a composite [`CommandKey`]: one entry per guild
//! a command is declared for, or a single global entry. Lookups use the
//! scope Discord reports in the interaction's command data, so a global
//! command invoked inside a guild still resolves to its global entry.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use barry_core::model::{ApplicationCommandData, CommandDataOption, CommandType, OptionType, Permissions};
use barry_core::{CommandInteraction, InteractionApi};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::{CommandError, CommandResult};

/// Where a command is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Global,
    Guild(String),
}

impl Scope {
    pub fn from_guild(guild_id: Option<&str>) -> Self {
        match guild_id {
            Some(id) => Self::Guild(id.to_string()),
            None => Self::Global,
        }
    }
}

/// Registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandKey {
    pub scope: Scope,
    pub kind: CommandType,
    pub name: String,
}

impl CommandKey {
    pub fn new(scope: Scope, kind: CommandType, name: impl Into<String>) -> Self {
        Self {
            scope,
            kind,
            name: name.into(),
        }
    }
}

/// The result of a lookup: the registered command and the most specific
/// definition the interaction addresses.
#[derive(Debug, Clone)]
pub struct ResolvedCommand {
    pub root: Arc<Command>,
    pub leaf: Arc<Command>,
    /// Subcommand group and subcommand names, outermost first.
    pub path: Vec<String>,
}

impl ResolvedCommand {
    /// Command name including subcommands, e.g. `config foo bar`.
    pub fn qualified_name(&self) -> String {
        std::iter::once(self.root.name())
            .chain(self.path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Leaf cooldown, falling back to the root's.
    pub fn cooldown(&self) -> Option<Duration> {
        self.leaf
            .cooldown_duration()
            .or_else(|| self.root.cooldown_duration())
    }

    /// Permissions required by the root and the leaf.
    pub fn app_permissions(&self) -> Permissions {
        self.root.required_app_permissions() | self.leaf.required_app_permissions()
    }

    pub fn module_id(&self) -> Option<&str> {
        self.root.module_id()
    }
}

/// Outcome of a [`CommandRegistry::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of global commands sent; `0` means no global call was made.
    pub global: usize,
    /// Number of commands sent per guild.
    pub guilds: BTreeMap<String, usize>,
}

/// Keyed store of command definitions.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<CommandKey, Arc<Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(command: &Command) -> Vec<CommandKey> {
        if command.is_global() {
            return vec![CommandKey::new(Scope::Global, command.kind(), command.name())];
        }
        command
            .guild_ids()
            .iter()
            .map(|guild| CommandKey::new(Scope::Guild(guild.clone()), command.kind(), command.name()))
            .collect()
    }

    /// Registers a command under each of its scopes.
    pub fn add(&self, command: impl Into<Arc<Command>>) -> Arc<Command> {
        let command = command.into();
        let mut commands = self.commands.write();
        for key in Self::keys(&command) {
            if commands.insert(key.clone(), Arc::clone(&command)).is_some() {
                warn!(command = %key.name, scope = ?key.scope, "Replaced an existing command");
            }
        }
        debug!(command = %command.name(), kind = %command.kind(), "Command registered");
        command
    }

    /// Removes a command from each of its scopes. Returns the number of
    /// entries removed.
    pub fn delete(&self, command: &Command) -> usize {
        let mut commands = self.commands.write();
        Self::keys(command)
            .iter()
            .filter(|key| commands.remove(*key).is_some())
            .count()
    }

    pub fn get_by_key(&self, key: &CommandKey) -> Option<Arc<Command>> {
        self.commands.read().get(key).cloned()
    }

    /// Looks up the command an interaction invokes.
    pub fn get(&self, interaction: &CommandInteraction) -> CommandResult<Option<ResolvedCommand>> {
        self.resolve(interaction.command_data())
    }

    /// Looks up the definition addressed by `data`, descending into children
    /// along the subcommand chain.
    ///
    /// Returns `Ok(None)` for unknown commands and subcommands.
    pub fn resolve(&self, data: &ApplicationCommandData) -> CommandResult<Option<ResolvedCommand>> {
        let key = CommandKey::new(
            Scope::from_guild(data.guild_id.as_deref()),
            data.kind,
            data.name.as_str(),
        );
        let Some(root) = self.get_by_key(&key) else {
            return Ok(None);
        };

        if data.kind != CommandType::ChatInput {
            return Ok(Some(ResolvedCommand {
                leaf: Arc::clone(&root),
                root,
                path: Vec::new(),
            }));
        }

        let mut leaf = Arc::clone(&root);
        let mut path = Vec::new();
        let mut options: &[CommandDataOption] = &data.options;

        while let Some(branch) = options.first().filter(|o| o.is_branch()) {
            let Some(child) = leaf.find_child(&branch.name).cloned() else {
                debug!(command = %root.name(), subcommand = %branch.name, "Unknown subcommand");
                return Ok(None);
            };
            match (branch.kind, child.has_children()) {
                (OptionType::SubcommandGroup, false) => {
                    return Err(CommandError::InvalidCommandType {
                        expected: "SUB_COMMAND",
                    });
                }
                (OptionType::Subcommand, true) => {
                    return Err(CommandError::InvalidCommandType {
                        expected: "SUB_COMMAND_GROUP",
                    });
                }
                _ => {}
            }
            path.push(branch.name.clone());
            options = &branch.options;
            leaf = child;
        }

        Ok(Some(ResolvedCommand { root, leaf, path }))
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Bulk-overwrites the registered commands: one call per guild with
    /// commands, plus one global call when there are global commands.
    pub async fn sync(
        &self,
        api: &dyn InteractionApi,
        application_id: &str,
    ) -> CommandResult<SyncSummary> {
        let (global, guilds) = self.partition();
        let mut summary = SyncSummary::default();

        for (guild_id, commands) in guilds {
            let count = commands.len();
            api.bulk_overwrite_guild_commands(application_id, &guild_id, commands)
                .await?;
            debug!(guild_id = %guild_id, count, "Synced guild commands");
            summary.guilds.insert(guild_id, count);
        }

        if !global.is_empty() {
            summary.global = global.len();
            api.bulk_overwrite_global_commands(application_id, global)
                .await?;
        }

        info!(
            global = summary.global,
            guilds = summary.guilds.len(),
            "Application commands synced"
        );
        Ok(summary)
    }

    /// Serializes every command once and groups the payloads by scope.
    fn partition(&self) -> (Vec<Value>, BTreeMap<String, Vec<Value>>) {
        let commands = self.commands.read();
        let mut serialized: HashMap<*const Command, Value> = HashMap::new();
        let mut global = Vec::new();
        let mut guilds: BTreeMap<String, Vec<Value>> = BTreeMap::new();

        let mut entries: Vec<_> = commands.iter().collect();
        entries.sort_by(|(a, _), (b, _)| (&a.scope, &a.name).cmp(&(&b.scope, &b.name)));

        for (key, command) in entries {
            let json = serialized
                .entry(Arc::as_ptr(command))
                .or_insert_with(|| command.to_json())
                .clone();
            match &key.scope {
                Scope::Global => global.push(json),
                Scope::Guild(id) => guilds.entry(id.clone()).or_default().push(json),
            }
        }
        (global, guilds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chat_data(guild_id: Option<&str>, name: &str, options: Value) -> ApplicationCommandData {
        serde_json::from_value(json!({
            "id": "1", "name": name, "type": 1,
            "guild_id": guild_id, "options": options
        }))
        .unwrap()
    }

    #[test]
    fn test_guild_scoped_and_global_same_name() {
        let registry = CommandRegistry::new();
        registry.add(Command::chat_input("rank", "guild").guilds(["A", "B"]));
        registry.add(Command::chat_input("rank", "global"));
        assert_eq!(registry.len(), 3);

        let in_a = registry.resolve(&chat_data(Some("A"), "rank", json!([]))).unwrap().unwrap();
        let in_b = registry.resolve(&chat_data(Some("B"), "rank", json!([]))).unwrap().unwrap();
        let global = registry.resolve(&chat_data(None, "rank", json!([]))).unwrap().unwrap();

        assert_eq!(in_a.root.description(), "guild");
        assert!(Arc::ptr_eq(&in_a.root, &in_b.root));
        assert_eq!(global.root.description(), "global");
        assert!(registry.resolve(&chat_data(Some("C"), "rank", json!([]))).unwrap().is_none());
    }

    #[test]
    fn test_delete_removes_every_scope() {
        let registry = CommandRegistry::new();
        let command = registry.add(Command::chat_input("rank", "guild").guilds(["A", "B"]));
        assert_eq!(registry.delete(&command), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_type_is_part_of_key() {
        let registry = CommandRegistry::new();
        registry.add(Command::user("Profile"));
        let data: ApplicationCommandData = serde_json::from_value(json!({
            "id": "1", "name": "Profile", "type": 3
        }))
        .unwrap();
        assert!(registry.resolve(&data).unwrap().is_none());
    }

    #[test]
    fn test_group_shape_mismatch() {
        let registry = CommandRegistry::new();
        registry.add(Command::chat_input("config", "c").child(Command::chat_input("foo", "leaf")));

        let data = chat_data(None, "config", json!([{ "name": "foo", "type": 2, "options": [] }]));
        let err = registry.resolve(&data).unwrap_err();
        assert_eq!(err.to_string(), "Invalid command type. Expected \"SUB_COMMAND\" command.");
    }

    #[test]
    fn test_parent_without_subcommand_resolves_to_parent() {
        let registry = CommandRegistry::new();
        registry.add(Command::chat_input("config", "c").child(Command::chat_input("foo", "leaf")));

        let resolved = registry.resolve(&chat_data(None, "config", json!([]))).unwrap().unwrap();
        assert_eq!(resolved.leaf.name(), "config");
        assert!(resolved.path.is_empty());
        assert_eq!(resolved.qualified_name(), "config");
    }

    #[test]
    fn test_resolved_command_inherits_root_settings() {
        let registry = CommandRegistry::new();
        registry.add(
            Command::chat_input("shop", "s")
                .module("market")
                .cooldown(Duration::from_secs(10))
                .app_permissions(Permissions::SEND_MESSAGES)
                .child(Command::chat_input("buy", "b").app_permissions(Permissions::EMBED_LINKS)),
        );

        let data = chat_data(None, "shop", json!([{ "name": "buy", "type": 1 }]));
        let resolved = registry.resolve(&data).unwrap().unwrap();

        assert_eq!(resolved.qualified_name(), "shop buy");
        assert_eq!(resolved.module_id(), Some("market"));
        assert_eq!(resolved.cooldown(), Some(Duration::from_secs(10)));
        assert_eq!(
            resolved.app_permissions(),
            Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS
        );
    }
}
