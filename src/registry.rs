//! Named connection registry.
//!
//! Built once at startup from the numbered environment slots and read-only
//! afterwards. When no slot yields a connection, the single legacy
//! configuration is tried under its own name.

use crate::config::{
    legacy_default_name, read_connection, ConfigKeys, ConnectionConfig, EnvSource, ProcessEnv,
    SlotOutcome,
};
use crate::constants::CONNECTION_SLOT_COUNT;
use crate::error::ServerError;
use tracing::{debug, info, warn};

/// Immutable mapping from connection name to its configuration.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Insertion (slot) order; names are unique.
    entries: Vec<ConnectionConfig>,
}

impl Registry {
    /// Load from the process environment.
    pub fn from_process_env() -> Self {
        Self::load(&ProcessEnv)
    }

    /// Load from an environment source.
    ///
    /// Incomplete enabled slots are skipped with a warning. A later slot
    /// with an already-used name replaces the earlier config.
    pub fn load(env: &dyn EnvSource) -> Self {
        let mut registry = Self::default();

        for index in 1..=CONNECTION_SLOT_COUNT {
            let keys = ConfigKeys::slot(index);
            match read_connection(env, &keys, index == 1, None) {
                SlotOutcome::Loaded(config) => registry.insert(config, &keys.label),
                SlotOutcome::Disabled => debug!("{} is disabled", keys.label),
                SlotOutcome::Unset => debug!("{} is not configured", keys.label),
                SlotOutcome::Incomplete { missing } => warn!(
                    "{} is enabled but incomplete (missing {}); skipping",
                    keys.label,
                    missing.join(", ")
                ),
            }
        }

        if registry.is_empty() {
            let keys = ConfigKeys::legacy();
            match read_connection(env, &keys, true, Some(legacy_default_name())) {
                SlotOutcome::Loaded(config) => registry.insert(config, &keys.label),
                SlotOutcome::Incomplete { missing } => warn!(
                    "{} is incomplete (missing {}); skipping",
                    keys.label,
                    missing.join(", ")
                ),
                SlotOutcome::Disabled | SlotOutcome::Unset => {}
            }
        }

        if registry.is_empty() {
            warn!("No database connections are configured");
        } else {
            info!(
                "Loaded {} connection(s): {}",
                registry.len(),
                registry.names().join(", ")
            );
        }

        registry
    }

    /// Build a registry from already-resolved configs, applying the same
    /// last-wins rule for duplicate names.
    pub fn from_configs(configs: impl IntoIterator<Item = ConnectionConfig>) -> Self {
        let mut registry = Self::default();
        for config in configs.into_iter().filter(|c| c.enabled) {
            registry.insert(config, "caller");
        }
        registry
    }

    fn insert(&mut self, config: ConnectionConfig, source: &str) {
        debug!(
            "{}: registered '{}' -> {} / {}",
            source,
            config.name,
            config.address(),
            config.database_name
        );
        match self.entries.iter_mut().find(|c| c.name == config.name) {
            Some(existing) => {
                warn!(
                    "{}: connection name '{}' is already in use; the later definition wins",
                    source, config.name
                );
                *existing = config;
            }
            None => self.entries.push(config),
        }
    }

    /// Look up a connection by exact name.
    pub fn resolve(&self, name: &str) -> Result<&ConnectionConfig, ServerError> {
        self.entries
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                let available = if self.is_empty() {
                    "none configured".to_string()
                } else {
                    self.names().join(", ")
                };
                ServerError::not_found(format!(
                    "Connection '{}' not found. Available connections: {}",
                    name, available
                ))
            })
    }

    /// Names in slot order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of configured connections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no connection is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
