//! Feature modules.
//!
//! A [`Module`] bundles the commands of one feature area (moderation,
//! leveling, ...). The dispatcher only ever asks a module whether it is
//! enabled in a guild; everything else a module does happens in its own
//! command handlers.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Leveling { settings: Arc<SettingsStore> }
//!
//! #[async_trait]
//! impl Module for Leveling {
//!     fn id(&self) -> &str {
//!         "leveling"
//!     }
//!
//!     fn commands(&self) -> Vec<Command> {
//!         vec![rank_command()]
//!     }
//!
//!     async fn is_enabled(&self, guild_id: &str) -> bool {
//!         self.settings.leveling_enabled(guild_id).await
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{error, info};

use crate::command::Command;

/// A feature area contributing commands.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Unique identifier, used to attach commands to the module.
    fn id(&self) -> &str;

    /// Commands to register; each is attached to this module.
    fn commands(&self) -> Vec<Command> {
        Vec::new()
    }

    /// Called once after registration, before events are processed.
    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether the module's commands may run in a guild.
    async fn is_enabled(&self, _guild_id: &str) -> bool {
        true
    }
}

/// A shared module.
pub type BoxedModule = Arc<dyn Module>;

/// Registered modules, by ID.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, BoxedModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module and returns its commands, attached to it.
    pub fn add(&self, module: BoxedModule) -> Vec<Command> {
        let id = module.id().to_string();
        let commands = module
            .commands()
            .into_iter()
            .map(|command| command.module(id.as_str()))
            .collect::<Vec<_>>();
        info!(module = %id, commands = commands.len(), "Module registered");
        self.modules.write().insert(id, module);
        commands
    }

    pub fn get(&self, id: &str) -> Option<BoxedModule> {
        self.modules.read().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    /// Whether `module_id` is enabled in `guild_id`. Unknown modules are
    /// treated as enabled.
    pub async fn is_enabled(&self, module_id: &str, guild_id: &str) -> bool {
        match self.get(module_id) {
            Some(module) => module.is_enabled(guild_id).await,
            None => true,
        }
    }

    /// Runs every module's `initialize` hook. Failures are logged and counted;
    /// the failing module stays registered.
    pub async fn initialize_all(&self) -> usize {
        let modules: Vec<BoxedModule> = self.modules.read().values().cloned().collect();
        let mut failures = 0;
        for module in modules {
            if let Err(e) = module.initialize().await {
                error!(module = %module.id(), error = %e, "Module failed to initialize");
                failures += 1;
            }
        }
        failures
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.ids())
            .finish()
    }
}
