//! Per-user command cooldowns.
//!
//! Entries map `(scope, command, user)` to an expiry time. Expired entries are
//! not swept; they are dropped when next looked at.
//!
//! Expiries are capped at the end of year 9999, so a cooldown too long to
//! represent never expires.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::registry::Scope;

/// 9999-12-31T23:59:59Z.
const LATEST_EXPIRY_SECS: u64 = 253_402_300_799;

fn expiry_after(now: SystemTime, duration: Duration) -> SystemTime {
    let latest = UNIX_EPOCH + Duration::from_secs(LATEST_EXPIRY_SECS);
    now.checked_add(duration).map_or(latest, |expiry| expiry.min(latest))
}

/// Identifies one cooldown entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub scope: Scope,
    pub command: String,
    pub user_id: String,
}

impl CooldownKey {
    pub fn new(scope: Scope, command: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            scope,
            command: command.into(),
            user_id: user_id.into(),
        }
    }
}

/// In-memory cooldown store.
#[derive(Debug, Default)]
pub struct CooldownManager {
    entries: Mutex<HashMap<CooldownKey, SystemTime>>,
}

impl CooldownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the expiry of an active cooldown, evicting it if it expired.
    pub fn check(&self, key: &CooldownKey, now: SystemTime) -> Option<SystemTime> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(&expiry) if expiry > now => Some(expiry),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Starts (or restarts) a cooldown.
    pub fn trigger(&self, key: CooldownKey, duration: Duration, now: SystemTime) {
        self.entries.lock().insert(key, expiry_after(now, duration));
    }

    /// Checks and, if no cooldown is active, starts one in the same critical
    /// section.
    ///
    /// Returns the expiry of the active cooldown on refusal.
    pub fn acquire(
        &self,
        key: CooldownKey,
        duration: Duration,
        now: SystemTime,
    ) -> Result<(), SystemTime> {
        let mut entries = self.entries.lock();
        if let Some(&expiry) = entries.get(&key)
            && expiry > now
        {
            return Err(expiry);
        }
        entries.insert(key, expiry_after(now, duration));
        Ok(())
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
