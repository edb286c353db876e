//! Rule-driven masker.

use super::{MaskStrategy, MaskingError, ResultMasker, RuleSpec, StrategyOptions, StrategyRegistry};
use crate::database::SqlValue;
use regex::Regex;
use std::sync::Arc;

enum ColumnMatcher {
    /// Lowercased column name
    Exact(String),
    Pattern(Regex),
}

impl ColumnMatcher {
    fn matches(&self, column: &str) -> bool {
        match self {
            Self::Exact(name) => column.eq_ignore_ascii_case(name),
            Self::Pattern(re) => re.is_match(column),
        }
    }
}

struct CompiledRule {
    column: ColumnMatcher,
    value: Option<Regex>,
    strategy: Arc<dyn MaskStrategy>,
    options: StrategyOptions,
}

/// Applies manifest rules in order; the first rule that matches a value wins.
pub struct RuleMasker {
    rules: Vec<CompiledRule>,
}

impl RuleMasker {
    /// Compile rules against the available strategies.
    ///
    /// Any invalid rule rejects the whole set.
    pub fn compile(rules: &[RuleSpec], strategies: &StrategyRegistry) -> Result<Self, MaskingError> {
        let compiled = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| compile_rule(index, rule, strategies))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules: compiled })
    }

    /// Number of compiled rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

fn compile_rule(
    index: usize,
    rule: &RuleSpec,
    strategies: &StrategyRegistry,
) -> Result<CompiledRule, MaskingError> {
    let invalid = |message: String| MaskingError::InvalidRule { index, message };
    let regex = |pattern: &str| {
        Regex::new(pattern).map_err(|e| invalid(format!("bad pattern '{}': {}", pattern, e)))
    };

    let column = match (rule.column.as_deref(), rule.column_pattern.as_deref()) {
        (Some(name), None) if !name.trim().is_empty() => {
            ColumnMatcher::Exact(name.trim().to_lowercase())
        }
        (None, Some(pattern)) => ColumnMatcher::Pattern(regex(pattern)?),
        (Some(_), Some(_)) => {
            return Err(invalid(
                "set either 'column' or 'column_pattern', not both".to_string(),
            ))
        }
        _ => return Err(invalid("a non-empty 'column' or 'column_pattern' is required".to_string())),
    };

    let value = rule.value_pattern.as_deref().map(regex).transpose()?;

    let strategy = strategies
        .get(&rule.strategy)
        .ok_or_else(|| MaskingError::UnknownStrategy(rule.strategy.clone()))?;
    strategy
        .validate(&rule.options)
        .map_err(|e| invalid(e.to_string()))?;

    Ok(CompiledRule {
        column,
        value,
        strategy,
        options: rule.options.clone(),
    })
}

impl ResultMasker for RuleMasker {
    fn is_enabled(&self) -> bool {
        !self.rules.is_empty()
    }

    fn mask(
        &self,
        columns: &[String],
        rows: &[Vec<SqlValue>],
    ) -> Result<Vec<Vec<SqlValue>>, MaskingError> {
        // Rules whose column matcher accepts each column, in rule order.
        let candidates: Vec<Vec<&CompiledRule>> = columns
            .iter()
            .map(|column| {
                self.rules
                    .iter()
                    .filter(|rule| rule.column.matches(column))
                    .collect()
            })
            .collect();

        if candidates.iter().all(Vec::is_empty) {
            return Ok(rows.to_vec());
        }

        rows.iter()
            .enumerate()
            .map(|(row_index, row)| {
                if row.len() != columns.len() {
                    return Err(MaskingError::Shape {
                        row: row_index,
                        expected: columns.len(),
                        actual: row.len(),
                    });
                }
                row.iter()
                    .zip(&candidates)
                    .map(|(value, rules)| mask_value(value, rules))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

fn mask_value(value: &SqlValue, rules: &[&CompiledRule]) -> Result<SqlValue, MaskingError> {
    if value.is_null() || rules.is_empty() {
        return Ok(value.clone());
    }

    let text = value.to_display_string();
    let rule = rules.iter().find(|rule| {
        rule.value
            .as_ref()
            .map(|re| re.is_match(&text))
            .unwrap_or(true)
    });

    match rule {
        Some(rule) => rule.strategy.apply(value, &rule.options),
        None => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule_specs(value: serde_json::Value) -> Vec<RuleSpec> {
        serde_json::from_value(value).unwrap()
    }

    fn masker(value: serde_json::Value) -> RuleMasker {
        RuleMasker::compile(&rule_specs(value), &StrategyRegistry::with_builtins()).unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_redacts_every_value_in_matched_column_only() {
        let masker = masker(json!([{ "column": "ssn", "strategy": "redact" }]));
        let rows = vec![
            vec![SqlValue::I32(1), "123-45-6789".into(), "Ada".into()],
            vec![SqlValue::I32(2), "987-65-4321".into(), "Grace".into()],
        ];

        let masked = masker.mask(&columns(&["id", "ssn", "name"]), &rows).unwrap();
        assert_eq!(
            masked,
            vec![
                vec![SqlValue::I32(1), "[REDACTED]".into(), "Ada".into()],
                vec![SqlValue::I32(2), "[REDACTED]".into(), "Grace".into()],
            ]
        );
    }

    #[test]
    fn test_column_name_is_case_insensitive() {
        let masker = masker(json!([{ "column": "SSN", "strategy": "redact" }]));
        let masked = masker
            .mask(&columns(&["Ssn"]), &[vec!["1".into()]])
            .unwrap();
        assert_eq!(masked, vec![vec![SqlValue::from("[REDACTED]")]]);
    }

    #[test]
    fn test_value_pattern_and_first_match_wins() {
        let masker = masker(json!([
            { "column": "notes", "value_pattern": "\\d{3}-\\d{2}-\\d{4}", "strategy": "redact",
              "options": { "replacement": "[SSN]" } },
            { "column_pattern": "(?i)^notes$", "strategy": "partial",
              "options": { "keep_start": 2, "keep_end": 0 } }
        ]));
        let rows = vec![
            vec![SqlValue::from("ssn is 123-45-6789")],
            vec![SqlValue::from("hello")],
            vec![SqlValue::Null],
        ];
        let masked = masker.mask(&columns(&["notes"]), &rows).unwrap();
        assert_eq!(
            masked,
            vec![
                vec![SqlValue::from("[SSN]")],
                vec![SqlValue::from("he***")],
                vec![SqlValue::Null],
            ]
        );
    }

    #[test]
    fn test_no_matching_columns_is_identity() {
        let masker = masker(json!([{ "column": "ssn", "strategy": "hash" }]));
        let rows = vec![vec![SqlValue::I32(1)]];
        assert_eq!(masker.mask(&columns(&["id"]), &rows).unwrap(), rows);
    }

    #[test]
    fn test_row_shape_mismatch_is_an_error() {
        let masker = masker(json!([{ "column": "ssn", "strategy": "redact" }]));
        let err = masker
            .mask(&columns(&["ssn", "name"]), &[vec!["1".into()]])
            .unwrap_err();
        assert!(matches!(err, MaskingError::Shape { row: 0, .. }));
    }

    #[test]
    fn test_compile_errors() {
        let strategies = StrategyRegistry::with_builtins();
        for bad in [
            json!([{ "strategy": "redact" }]),
            json!([{ "column": "a", "column_pattern": "b", "strategy": "redact" }]),
            json!([{ "column_pattern": "(", "strategy": "redact" }]),
            json!([{ "column": "a", "value_pattern": "[", "strategy": "redact" }]),
            json!([{ "column": "a", "strategy": "partial", "options": { "keep_end": "x" } }]),
            json!([{ "column": "a", "strategy": "shred" }]),
        ] {
            assert!(RuleMasker::compile(&rule_specs(bad), &strategies).is_err());
        }
    }

    #[test]
    fn test_empty_rule_set_is_disabled() {
        assert!(!masker(json!([])).is_enabled());
    }
}
