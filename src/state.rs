//! Application context shared by every tool call.
//!
//! Everything here is built once, before the server starts accepting calls,
//! and never mutated afterwards.

use crate::config::{self, ProcessEnv};
use crate::database::{Connector, TiberiusConnector};
use crate::masking::{MaskingSetup, StrategyRegistry};
use crate::registry::Registry;
use std::sync::Arc;
use std::time::Duration;

/// Shared context wrapper type.
pub type SharedContext = Arc<AppContext>;

/// Read-only state injected into every operation.
pub struct AppContext {
    /// Logical connection names and their configs.
    pub registry: Registry,

    /// Post-processor for `execute_query` results.
    pub masking: MaskingSetup,

    /// Opens backend connections.
    pub connector: Arc<dyn Connector>,

    /// Upper bound on opening one connection.
    pub connect_timeout: Duration,
}

impl AppContext {
    /// Assemble a context from its parts.
    pub fn new(
        registry: Registry,
        masking: MaskingSetup,
        connector: Arc<dyn Connector>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            masking,
            connector,
            connect_timeout,
        }
    }

    /// Build the production context from the process environment and the
    /// installed manifest.
    pub fn from_env() -> Self {
        Self::new(
            Registry::from_process_env(),
            MaskingSetup::from_installation(&StrategyRegistry::with_builtins()),
            Arc::new(TiberiusConnector),
            config::connect_timeout(&ProcessEnv),
        )
    }

    /// Wrap in an `Arc` for sharing across calls.
    pub fn into_shared(self) -> SharedContext {
        Arc::new(self)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("connections", &self.registry.names())
            .field("masking", &self.masking)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
