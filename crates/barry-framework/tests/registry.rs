mod common;

use std::sync::Arc;

use barry_core::CommandInteraction;
use barry_framework::{Client, Command, CommandError, SyncSummary};
use common::*;
use serde_json::{Value, json};

fn command_interaction(client: &Client, payload: Value) -> CommandInteraction {
    let interaction = client.decode(payload).unwrap();
    CommandInteraction::from_interaction(Arc::new(interaction)).unwrap()
}

fn settings() -> Command {
    Command::chat_input("settings", "Bot settings")
        .child(
            Command::chat_input("leveling", "Leveling settings")
                .child(Command::chat_input("enable", "Enable leveling")),
        )
        .child(Command::chat_input("reset", "Reset everything"))
}

#[test]
fn test_subcommand_group_resolves_to_leaf() {
    let (_, client) = client(vec![settings()]);
    let interaction = command_interaction(
        &client,
        chat_input(
            "1",
            "settings",
            json!([{
                "name": "leveling", "type": 2,
                "options": [{ "name": "enable", "type": 1, "options": [] }]
            }]),
        ),
    );

    let resolved = client.commands().get(&interaction).unwrap().unwrap();
    assert_eq!(resolved.root.name(), "settings");
    assert_eq!(resolved.leaf.name(), "enable");
    assert_eq!(resolved.qualified_name(), "settings leveling enable");
}

#[test]
fn test_unknown_subcommand_is_not_found() {
    let (_, client) = client(vec![settings()]);
    let interaction = command_interaction(
        &client,
        chat_input("1", "settings", json!([{ "name": "missing", "type": 1 }])),
    );

    assert!(client.commands().get(&interaction).unwrap().is_none());
}

#[test]
fn test_subcommand_shape_mismatch_is_rejected() {
    let (_, client) = client(vec![settings()]);
    let interaction = command_interaction(
        &client,
        chat_input("1", "settings", json!([{ "name": "leveling", "type": 1 }])),
    );

    let err = client.commands().get(&interaction).unwrap_err();
    assert!(matches!(
        err,
        CommandError::InvalidCommandType {
            expected: "SUB_COMMAND_GROUP"
        }
    ));
}

#[test]
fn test_guild_and_global_commands_are_scoped_separately() {
    let guild_echo = Command::chat_input("echo", "Guild echo").guilds(["A", "B"]);
    let global_echo = Command::chat_input("echo", "Global echo");
    let (_, client) = client(vec![guild_echo, global_echo]);
    assert_eq!(client.commands().len(), 3);

    let in_guild = command_interaction(&client, registered_in(chat_input("1", "echo", json!([])), "B"));
    let resolved = client.commands().get(&in_guild).unwrap().unwrap();
    assert_eq!(resolved.root.description(), "Guild echo");

    let global = command_interaction(&client, chat_input("2", "echo", json!([])));
    let resolved = client.commands().get(&global).unwrap().unwrap();
    assert_eq!(resolved.root.description(), "Global echo");

    let elsewhere = command_interaction(&client, registered_in(chat_input("3", "echo", json!([])), "C"));
    assert!(client.commands().get(&elsewhere).unwrap().is_none());
}

#[test]
fn test_delete_removes_every_scope() {
    let (_, client) = client(vec![]);
    let echo = client.register_command(Command::chat_input("echo", "Echo").guilds(["A", "B"]));

    assert_eq!(client.commands().delete(&echo), 2);
    assert!(client.commands().is_empty());
}

#[tokio::test]
async fn test_sync_makes_one_call_per_scope() {
    let (api, client) = client(vec![
        Command::chat_input("ping", "Ping"),
        Command::user("Profile"),
        Command::chat_input("echo", "Echo").guilds(["A", "B"]),
        Command::chat_input("ban", "Ban").guild("B"),
    ]);

    let summary = client.sync_commands().await.unwrap();

    let mut guilds = std::collections::BTreeMap::new();
    guilds.insert("A".to_string(), 1);
    guilds.insert("B".to_string(), 2);
    assert_eq!(summary, SyncSummary { global: 2, guilds });

    let calls = api.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.contains(&Call::GuildCommands("A".into(), vec!["echo".into()])));
    assert!(calls.contains(&Call::GuildCommands(
        "B".into(),
        vec!["ban".into(), "echo".into()]
    )));
    assert!(calls.contains(&Call::GlobalCommands(vec![
        "Profile".into(),
        "ping".into()
    ])));
}

#[tokio::test]
async fn test_sync_skips_empty_global_scope() {
    let (api, client) = client(vec![Command::chat_input("echo", "Echo").guild("A")]);

    let summary = client.sync_commands().await.unwrap();

    assert_eq!(summary.global, 0);
    assert_eq!(
        api.calls(),
        vec![Call::GuildCommands("A".into(), vec!["echo".into()])]
    );
}
