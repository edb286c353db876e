//! Replacement strategies.
//!
//! Strategies are looked up by name from a [`StrategyRegistry`]. The built-in
//! `redact`, `partial` and `hash` strategies are always present; deployments
//! can register their own before the manifest rules are compiled.

use super::MaskingError;
use crate::constants::{DEFAULT_MASK_CHAR, DEFAULT_REDACTION};
use crate::database::SqlValue;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Free-form options attached to a rule.
pub type StrategyOptions = Map<String, Value>;

/// A named way of replacing a sensitive value.
pub trait MaskStrategy: Send + Sync {
    /// Name used in manifest rules.
    fn name(&self) -> &str;

    /// Check a rule's options when the rules are compiled.
    fn validate(&self, _options: &StrategyOptions) -> Result<(), MaskingError> {
        Ok(())
    }

    /// Produce the replacement for a non-null value.
    fn apply(&self, value: &SqlValue, options: &StrategyOptions)
        -> Result<SqlValue, MaskingError>;
}

/// Strategies available to masking rules, by name.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn MaskStrategy>>,
}

impl StrategyRegistry {
    /// A registry holding the built-in strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(RedactStrategy));
        registry.register(Arc::new(PartialStrategy));
        registry.register(Arc::new(HashStrategy));
        registry
    }

    /// Add a strategy, replacing any with the same name.
    pub fn register(&mut self, strategy: Arc<dyn MaskStrategy>) {
        self.strategies
            .insert(strategy.name().to_lowercase(), strategy);
    }

    /// Look up a strategy by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<Arc<dyn MaskStrategy>> {
        self.strategies.get(&name.trim().to_lowercase()).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Replaces the whole value with a fixed string.
///
/// Options: `replacement` (default `[REDACTED]`).
#[derive(Debug, Clone, Copy)]
pub struct RedactStrategy;

impl MaskStrategy for RedactStrategy {
    fn name(&self) -> &str {
        "redact"
    }

    fn validate(&self, options: &StrategyOptions) -> Result<(), MaskingError> {
        string_option(self.name(), options, "replacement").map(|_| ())
    }

    fn apply(
        &self,
        _value: &SqlValue,
        options: &StrategyOptions,
    ) -> Result<SqlValue, MaskingError> {
        let replacement = string_option(self.name(), options, "replacement")?
            .unwrap_or(DEFAULT_REDACTION);
        Ok(SqlValue::String(replacement.to_string()))
    }
}

/// Keeps the first and last few characters, masks the rest.
///
/// Options: `keep_start` (default 0), `keep_end` (default 4), `mask_char`
/// (default `*`). Values too short to reveal anything are fully masked.
#[derive(Debug, Clone, Copy)]
pub struct PartialStrategy;

impl PartialStrategy {
    fn settings(&self, options: &StrategyOptions) -> Result<(usize, usize, char), MaskingError> {
        let keep_start = count_option(self.name(), options, "keep_start")?.unwrap_or(0);
        let keep_end = count_option(self.name(), options, "keep_end")?.unwrap_or(4);
        let mask_char = match string_option(self.name(), options, "mask_char")? {
            None => DEFAULT_MASK_CHAR,
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(invalid(
                            self.name(),
                            "mask_char must be exactly one character",
                        ))
                    }
                }
            }
        };
        Ok((keep_start, keep_end, mask_char))
    }
}

impl MaskStrategy for PartialStrategy {
    fn name(&self) -> &str {
        "partial"
    }

    fn validate(&self, options: &StrategyOptions) -> Result<(), MaskingError> {
        self.settings(options).map(|_| ())
    }

    fn apply(&self, value: &SqlValue, options: &StrategyOptions) -> Result<SqlValue, MaskingError> {
        let (keep_start, keep_end, mask_char) = self.settings(options)?;
        let chars: Vec<char> = value.to_display_string().chars().collect();
        let len = chars.len();

        let masked: String = if keep_start.saturating_add(keep_end) >= len {
            std::iter::repeat(mask_char).take(len).collect()
        } else {
            chars[..keep_start]
                .iter()
                .copied()
                .chain(std::iter::repeat(mask_char).take(len - keep_start - keep_end))
                .chain(chars[len - keep_end..].iter().copied())
                .collect()
        };
        Ok(SqlValue::String(masked))
    }
}

/// Replaces the value with its SHA-256 digest in lowercase hex.
///
/// Options: `salt` (prepended before hashing). Equal inputs give equal
/// outputs, so masked columns can still be joined or grouped on.
#[derive(Debug, Clone, Copy)]
pub struct HashStrategy;

impl MaskStrategy for HashStrategy {
    fn name(&self) -> &str {
        "hash"
    }

    fn validate(&self, options: &StrategyOptions) -> Result<(), MaskingError> {
        string_option(self.name(), options, "salt").map(|_| ())
    }

    fn apply(&self, value: &SqlValue, options: &StrategyOptions) -> Result<SqlValue, MaskingError> {
        let salt = string_option(self.name(), options, "salt")?.unwrap_or("");
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(value.to_display_string().as_bytes());
        let digest = hasher.finalize();
        Ok(SqlValue::String(
            digest.iter().map(|b| format!("{:02x}", b)).collect(),
        ))
    }
}

fn invalid(strategy: &str, message: impl Into<String>) -> MaskingError {
    MaskingError::Strategy {
        strategy: strategy.to_string(),
        message: message.into(),
    }
}

fn string_option<'a>(
    strategy: &str,
    options: &'a StrategyOptions,
    key: &str,
) -> Result<Option<&'a str>, MaskingError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(invalid(
            strategy,
            format!("option '{}' must be a string, got {}", key, other),
        )),
    }
}

fn count_option(
    strategy: &str,
    options: &StrategyOptions,
    key: &str,
) -> Result<Option<usize>, MaskingError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                invalid(
                    strategy,
                    format!("option '{}' must be a non-negative integer, got {}", key, v),
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(value: Value) -> StrategyOptions {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_redact_default_and_custom() {
        let value = SqlValue::from("123-45-6789");
        assert_eq!(
            RedactStrategy.apply(&value, &opts(json!({}))).unwrap(),
            SqlValue::from("[REDACTED]")
        );
        assert_eq!(
            RedactStrategy
                .apply(&value, &opts(json!({"replacement": "***"})))
                .unwrap(),
            SqlValue::from("***")
        );
        assert!(RedactStrategy
            .validate(&opts(json!({"replacement": 5})))
            .is_err());
    }

    #[test]
    fn test_partial_keeps_edges() {
        let value = SqlValue::from("alice@example.com");
        let masked = PartialStrategy
            .apply(&value, &opts(json!({"keep_start": 1, "keep_end": 4})))
            .unwrap();
        assert_eq!(masked, SqlValue::from("a************.com"));
    }

    #[test]
    fn test_partial_short_value_fully_masked() {
        let masked = PartialStrategy
            .apply(&SqlValue::from("abc"), &opts(json!({"mask_char": "#"})))
            .unwrap();
        assert_eq!(masked, SqlValue::from("###"));
    }

    #[test]
    fn test_partial_on_numbers_and_unicode() {
        let masked = PartialStrategy
            .apply(&SqlValue::I64(4111111111111111), &opts(json!({})))
            .unwrap();
        assert_eq!(masked, SqlValue::from("************1111"));

        let masked = PartialStrategy
            .apply(&SqlValue::from("Zoë Ångström"), &opts(json!({"keep_start": 2, "keep_end": 0})))
            .unwrap();
        assert_eq!(masked, SqlValue::from("Zo**********"));
    }

    #[test]
    fn test_partial_huge_keep_counts_mask_everything() {
        let value = SqlValue::from("123-45-6789");
        for options in [
            json!({"keep_start": usize::MAX, "keep_end": 4}),
            json!({"keep_start": 1, "keep_end": usize::MAX}),
            json!({"keep_start": usize::MAX, "keep_end": usize::MAX}),
        ] {
            let options = opts(options);
            assert!(PartialStrategy.validate(&options).is_ok());
            assert_eq!(
                PartialStrategy.apply(&value, &options).unwrap(),
                SqlValue::from("***********")
            );
        }
    }

    #[test]
    fn test_partial_rejects_bad_options() {
        assert!(PartialStrategy
            .validate(&opts(json!({"keep_end": -1})))
            .is_err());
        assert!(PartialStrategy
            .validate(&opts(json!({"mask_char": "ab"})))
            .is_err());
    }

    #[test]
    fn test_hash_is_stable_and_salted() {
        let value = SqlValue::from("abc");
        let plain = HashStrategy.apply(&value, &opts(json!({}))).unwrap();
        assert_eq!(
            plain,
            SqlValue::from("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        let salted = HashStrategy
            .apply(&value, &opts(json!({"salt": "pepper"})))
            .unwrap();
        assert_ne!(plain, salted);
    }

    #[test]
    fn test_registry_lookup() {
        struct Initials;

        impl MaskStrategy for Initials {
            fn name(&self) -> &str {
                "Initials"
            }

            fn apply(
                &self,
                value: &SqlValue,
                _options: &StrategyOptions,
            ) -> Result<SqlValue, MaskingError> {
                Ok(SqlValue::String(
                    value
                        .to_display_string()
                        .split_whitespace()
                        .filter_map(|w| w.chars().next())
                        .collect(),
                ))
            }
        }

        let mut registry = StrategyRegistry::with_builtins();
        registry.register(Arc::new(Initials));
        assert_eq!(registry.names(), vec!["hash", "initials", "partial", "redact"]);
        assert!(registry.get(" REDACT ").is_some());
        let initials = registry.get("initials").unwrap();
        assert_eq!(
            initials
                .apply(&SqlValue::from("Ada King Lovelace"), &StrategyOptions::new())
                .unwrap(),
            SqlValue::from("AKL")
        );
        assert!(registry.get("shred").is_none());
    }
}
