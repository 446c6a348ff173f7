//! Executor configuration
//!
//! Two behaviours are policy-driven rather than hard-coded: what happens when
//! a step re-declares a reference identifier, and how strictly `is_hidden`
//! is typed.

use serde_json::Value;

use crate::errors::{Result, StepError};

pub const ENV_REFERENCE_POLICY: &str = "TREESHIFT_REFERENCE_POLICY";
pub const ENV_HIDDEN_FLAG_POLICY: &str = "TREESHIFT_HIDDEN_FLAG_POLICY";

/// Policy for binding an identifier that is already bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Reject the second binding with `DuplicateReference`.
    #[default]
    FailOnDuplicate,
    /// Replace the previous value.
    Overwrite,
}

impl ReferencePolicy {
    /// Parse from string; unknown values default to `FailOnDuplicate`.
    pub fn parse(s: &str) -> Self {
        match s {
            "overwrite" => ReferencePolicy::Overwrite,
            _ => ReferencePolicy::FailOnDuplicate,
        }
    }
}

/// Policy for interpreting the `is_hidden` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HiddenFlagPolicy {
    /// Only JSON booleans are accepted.
    #[default]
    Strict,
    /// Scalars are coerced by truthiness: `false`, `0`, `""`, `"0"` and
    /// `"false"` are false, everything else is true.
    Coerce,
}

impl HiddenFlagPolicy {
    /// Parse from string; unknown values default to `Strict`.
    pub fn parse(s: &str) -> Self {
        match s {
            "coerce" => HiddenFlagPolicy::Coerce,
            _ => HiddenFlagPolicy::Strict,
        }
    }

    /// Interpret a resolved `is_hidden` value under this policy.
    pub fn interpret(&self, value: &Value) -> Result<bool> {
        match (self, value) {
            (_, Value::Bool(b)) => Ok(*b),
            (HiddenFlagPolicy::Strict, other) => Err(StepError::invalid(
                "is_hidden",
                format!("expected a boolean, got {}", other),
            )),
            (HiddenFlagPolicy::Coerce, Value::Number(n)) => {
                Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(true))
            }
            (HiddenFlagPolicy::Coerce, Value::String(s)) => {
                Ok(!matches!(s.as_str(), "" | "0" | "false"))
            }
            (HiddenFlagPolicy::Coerce, Value::Array(items)) => Ok(!items.is_empty()),
            (HiddenFlagPolicy::Coerce, Value::Object(map)) => Ok(!map.is_empty()),
            (HiddenFlagPolicy::Coerce, Value::Null) => Ok(false),
        }
    }
}

/// Configuration for one migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutorConfig {
    pub reference_policy: ReferencePolicy,
    pub hidden_flag_policy: HiddenFlagPolicy,
}

impl ExecutorConfig {
    pub fn new(reference_policy: ReferencePolicy, hidden_flag_policy: HiddenFlagPolicy) -> Self {
        Self {
            reference_policy,
            hidden_flag_policy,
        }
    }

    /// Read policies from `TREESHIFT_REFERENCE_POLICY` and
    /// `TREESHIFT_HIDDEN_FLAG_POLICY`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, config file section).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let reference_policy = lookup(ENV_REFERENCE_POLICY)
            .map(|v| ReferencePolicy::parse(v.trim()))
            .unwrap_or_default();
        let hidden_flag_policy = lookup(ENV_HIDDEN_FLAG_POLICY)
            .map(|v| HiddenFlagPolicy::parse(v.trim()))
            .unwrap_or_default();
        Self::new(reference_policy, hidden_flag_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_conservative() {
        let config = ExecutorConfig::default();
        assert_eq!(config.reference_policy, ReferencePolicy::FailOnDuplicate);
        assert_eq!(config.hidden_flag_policy, HiddenFlagPolicy::Strict);
    }

    #[test]
    fn test_from_lookup() {
        let config = ExecutorConfig::from_lookup(|key| match key {
            ENV_REFERENCE_POLICY => Some("overwrite".to_string()),
            ENV_HIDDEN_FLAG_POLICY => Some(" coerce ".to_string()),
            _ => None,
        });
        assert_eq!(config.reference_policy, ReferencePolicy::Overwrite);
        assert_eq!(config.hidden_flag_policy, HiddenFlagPolicy::Coerce);
    }

    #[test]
    fn test_strict_rejects_non_boolean() {
        let err = HiddenFlagPolicy::Strict.interpret(&json!(1)).unwrap_err();
        assert!(matches!(err, StepError::InvalidParameter { .. }));
        assert!(HiddenFlagPolicy::Strict.interpret(&json!(true)).unwrap());
    }

    #[test]
    fn test_coerce_truthiness() {
        let policy = HiddenFlagPolicy::Coerce;
        assert!(policy.interpret(&json!(1)).unwrap());
        assert!(policy.interpret(&json!("yes")).unwrap());
        assert!(!policy.interpret(&json!(0)).unwrap());
        assert!(!policy.interpret(&json!("0")).unwrap());
        assert!(!policy.interpret(&json!("")).unwrap());
        assert!(!policy.interpret(&json!("false")).unwrap());
    }
}
