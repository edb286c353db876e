//! PII masking of tabular query results.
//!
//! Masking is configured by the `pii_masking` section of the packaged
//! `manifest.json` and applied only to results of `execute_query`. A missing
//! or broken configuration disables masking; it never stops the server.
//!
//! ```json
//! {
//!   "pii_masking": {
//!     "enabled": true,
//!     "on_failure": "return_unmasked",
//!     "rules": [
//!       { "column": "ssn", "strategy": "redact" },
//!       { "column_pattern": "(?i)e?mail", "strategy": "partial",
//!         "options": { "keep_start": 1, "keep_end": 4 } }
//!     ]
//!   }
//! }
//! ```

mod manifest;
mod masker;
mod strategy;

pub use manifest::{locate_manifest, read_manifest, ManifestOutcome, MaskingSection, RuleSpec};
pub use masker::RuleMasker;
pub use strategy::{
    HashStrategy, MaskStrategy, PartialStrategy, RedactStrategy, StrategyOptions, StrategyRegistry,
};

use crate::database::SqlValue;
use crate::error::ServerError;
use serde::Deserialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Masking failures. Logged, and surfaced only under [`MaskingPolicy::FailClosed`].
#[derive(Debug, Error)]
pub enum MaskingError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed masking configuration: {0}")]
    Malformed(String),

    #[error("rule {index}: {message}")]
    InvalidRule { index: usize, message: String },

    #[error("unknown masking strategy '{0}'")]
    UnknownStrategy(String),

    #[error("strategy '{strategy}' failed: {message}")]
    Strategy { strategy: String, message: String },

    #[error("row {row} has {actual} values but the result has {expected} columns")]
    Shape {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("masking panicked: {0}")]
    Panicked(String),
}

/// What to do with a result when masking it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingPolicy {
    /// Log the failure and return the rows unmasked.
    #[default]
    ReturnUnmasked,
    /// Fail the call; no rows are returned.
    FailClosed,
}

/// Post-processor applied to tabular results.
pub trait ResultMasker: Send + Sync {
    /// Whether any masking will be applied.
    fn is_enabled(&self) -> bool;

    /// Mask `rows`, aligned positionally with `columns`.
    fn mask(
        &self,
        columns: &[String],
        rows: &[Vec<SqlValue>],
    ) -> Result<Vec<Vec<SqlValue>>, MaskingError>;
}

/// Masker that leaves every result untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMasker;

impl ResultMasker for NoopMasker {
    fn is_enabled(&self) -> bool {
        false
    }

    fn mask(
        &self,
        _columns: &[String],
        rows: &[Vec<SqlValue>],
    ) -> Result<Vec<Vec<SqlValue>>, MaskingError> {
        Ok(rows.to_vec())
    }
}

/// Masker and failure policy loaded at startup.
#[derive(Clone)]
pub struct MaskingSetup {
    pub masker: Arc<dyn ResultMasker>,
    pub policy: MaskingPolicy,
}

impl std::fmt::Debug for MaskingSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskingSetup")
            .field("enabled", &self.masker.is_enabled())
            .field("policy", &self.policy)
            .finish()
    }
}

impl MaskingSetup {
    /// Masking switched off.
    pub fn disabled() -> Self {
        Self {
            masker: Arc::new(NoopMasker),
            policy: MaskingPolicy::default(),
        }
    }

    /// Load from the manifest next to the running executable.
    pub fn from_installation(strategies: &StrategyRegistry) -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        match exe_dir {
            Some(dir) => Self::from_dir(&dir, strategies),
            None => {
                warn!("PII masking disabled: cannot determine the installation directory");
                Self::disabled()
            }
        }
    }

    /// Load from the first manifest found at or above `dir`.
    pub fn from_dir(dir: &Path, strategies: &StrategyRegistry) -> Self {
        match locate_manifest(dir) {
            Some(path) => Self::from_outcome(read_manifest(&path), strategies),
            None => Self::from_outcome(ManifestOutcome::NotFound, strategies),
        }
    }

    /// Build from a manifest read result, logging why masking is off when it is.
    pub fn from_outcome(outcome: ManifestOutcome, strategies: &StrategyRegistry) -> Self {
        match outcome {
            ManifestOutcome::NotFound => {
                info!("PII masking disabled: no manifest found");
                Self::disabled()
            }
            ManifestOutcome::NoSection(path) => {
                info!(
                    "PII masking disabled: {} has no masking section",
                    path.display()
                );
                Self::disabled()
            }
            ManifestOutcome::Malformed { path, error } => {
                warn!(
                    "PII masking disabled: {} is malformed: {}",
                    path.display(),
                    error
                );
                Self::disabled()
            }
            ManifestOutcome::Loaded { path, section } => {
                let policy = section.on_failure;
                if !section.enabled {
                    info!("PII masking disabled by {}", path.display());
                    return Self {
                        masker: Arc::new(NoopMasker),
                        policy,
                    };
                }
                match RuleMasker::compile(&section.rules, strategies) {
                    Ok(masker) => {
                        info!(
                            "PII masking enabled: {} rule(s) from {}, on failure: {:?}",
                            masker.rule_count(),
                            path.display(),
                            policy
                        );
                        Self {
                            masker: Arc::new(masker),
                            policy,
                        }
                    }
                    Err(e) => {
                        warn!(
                            "PII masking disabled: invalid rules in {}: {}",
                            path.display(),
                            e
                        );
                        Self::disabled()
                    }
                }
            }
        }
    }

    /// Mask a tabular result, applying the failure policy.
    ///
    /// Strategy errors and panics are caught here.
    pub fn apply(
        &self,
        columns: &[String],
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<Vec<Vec<SqlValue>>, ServerError> {
        if !self.masker.is_enabled() {
            return Ok(rows);
        }

        let attempt = catch_unwind(AssertUnwindSafe(|| self.masker.mask(columns, &rows)))
            .unwrap_or_else(|panic| Err(MaskingError::Panicked(panic_message(&*panic))));

        match attempt {
            Ok(masked) => Ok(masked),
            Err(e) => match self.policy {
                MaskingPolicy::ReturnUnmasked => {
                    warn!("PII masking failed, returning unmasked rows: {}", e);
                    Ok(rows)
                }
                MaskingPolicy::FailClosed => {
                    warn!("PII masking failed, withholding result: {}", e);
                    Err(ServerError::masking(e.to_string()))
                }
            },
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
