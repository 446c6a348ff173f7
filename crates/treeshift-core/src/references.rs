//! Run-scoped reference table
//!
//! Steps bind node attributes to identifiers; later steps name them with a
//! `reference:<identifier>` token anywhere a value is accepted.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::ReferencePolicy;
use crate::errors::{Result, StepError};

/// Prefix marking a string value as a reference token
pub const REFERENCE_PREFIX: &str = "reference:";

/// Identifier named by `value`, if it is a reference token
pub fn reference_identifier(value: &Value) -> Option<&str> {
    value.as_str()?.strip_prefix(REFERENCE_PREFIX)
}

/// Key/value table of references bound during one run
///
/// Append-only under `ReferencePolicy::FailOnDuplicate`. One instance per
/// run; concurrent runs must not share it.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    values: BTreeMap<String, Value>,
    policy: ReferencePolicy,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ReferencePolicy) -> Self {
        Self {
            values: BTreeMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }

    /// Resolve a single value
    ///
    /// Tokens are replaced by their bound value; anything else passes through.
    ///
    /// # Errors
    ///
    /// `UnresolvedReference` if the token names an unbound identifier.
    pub fn resolve(&self, value: &Value) -> Result<Value> {
        match reference_identifier(value) {
            Some(identifier) => self
                .values
                .get(identifier)
                .cloned()
                .ok_or_else(|| StepError::UnresolvedReference {
                    identifier: identifier.to_string(),
                }),
            None => Ok(value.clone()),
        }
    }

    /// Resolve every scalar inside `value`, descending into lists and maps
    pub fn resolve_deep(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_deep(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.resolve_deep(v)?)))
                .collect::<Result<serde_json::Map<_, _>>>()
                .map(Value::Object),
            scalar => self.resolve(scalar),
        }
    }

    /// Bind `identifier` to `value`
    ///
    /// # Errors
    ///
    /// `DuplicateReference` if already bound and the policy forbids overwrite.
    pub fn bind(&mut self, identifier: impl Into<String>, value: Value) -> Result<()> {
        let identifier = identifier.into();
        if self.policy == ReferencePolicy::FailOnDuplicate && self.values.contains_key(&identifier)
        {
            return Err(StepError::DuplicateReference { identifier });
        }
        tracing::debug!(reference_id = %identifier, value = %value, "reference bound");
        self.values.insert(identifier, value);
        Ok(())
    }

    /// Check that `identifier` could be bound without error
    pub fn ensure_bindable(&self, identifier: &str) -> Result<()> {
        if self.policy == ReferencePolicy::FailOnDuplicate && self.values.contains_key(identifier) {
            return Err(StepError::DuplicateReference {
                identifier: identifier.to_string(),
            });
        }
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<&Value> {
        self.values.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.values.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
