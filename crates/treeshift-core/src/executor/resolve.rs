//! Reference substitution and typed parameter validation
//!
//! Everything that can be rejected without touching the repository is
//! rejected here, before the first matcher or store call.

use std::collections::BTreeSet;

use serde_json::Value;

use super::extraction::is_supported_attribute;
use crate::config::ExecutorConfig;
use crate::errors::{Result, StepError};
use crate::matcher::NodeKey;
use crate::model::{MatchSpec, ReferenceDeclaration, StepAction, StepDescription};
use crate::references::ReferenceStore;
use crate::sort_codec::{decode_sort_field, decode_sort_order};

/// A canonical step with every reference token replaced and every
/// parameter typed
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedStep {
    pub action: StepAction,
    pub match_spec: MatchSpec,
    pub parents: Vec<NodeKey>,
    pub swap_with: Option<NodeKey>,
    pub priority: Option<i32>,
    /// Validated identifiers; decoded against the node's current value later
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub is_hidden: Option<bool>,
    pub remote_id: Option<String>,
    pub references: Option<Vec<ReferenceDeclaration>>,
}

impl ResolvedStep {
    pub fn resolve(
        step: &StepDescription,
        refs: &ReferenceStore,
        config: &ExecutorConfig,
    ) -> Result<Self> {
        let params = &step.parameters;

        let match_spec = match refs.resolve_deep(&Value::Object(step.match_spec.clone()))? {
            Value::Object(spec) => spec,
            other => {
                return Err(StepError::Internal {
                    message: format!("match specification resolved to {}", other),
                })
            }
        };

        let parents = params
            .parent_targets
            .iter()
            .map(|target| NodeKey::from_value(&refs.resolve(target)?, "parent_location"))
            .collect::<Result<Vec<_>>>()?;

        let swap_with = params
            .swap_with
            .as_ref()
            .map(|target| NodeKey::from_value(&refs.resolve(target)?, "swap_with_location"))
            .transpose()?;

        if step.action == StepAction::Update {
            if swap_with.is_some() && !parents.is_empty() {
                return Err(StepError::ConflictingDirective {
                    reason: "cannot move a location to a new parent and swap it at the same time"
                        .to_string(),
                });
            }
            if parents.len() > 1 {
                return Err(StepError::UnsupportedOperation {
                    reason: format!(
                        "a location can be moved under exactly one parent, {} given",
                        parents.len()
                    ),
                });
            }
        }

        let priority = params
            .priority
            .as_ref()
            .map(|v| refs.resolve(v).and_then(|v| priority_value(&v)))
            .transpose()?;

        let sort_field = params
            .sort_field
            .as_ref()
            .map(|v| refs.resolve(v).and_then(|v| identifier_value("sort_field", &v)))
            .transpose()?;
        decode_sort_field(sort_field.as_deref(), None)?;

        let sort_order = params
            .sort_order
            .as_ref()
            .map(|v| refs.resolve(v).and_then(|v| identifier_value("sort_order", &v)))
            .transpose()?;
        decode_sort_order(sort_order.as_deref(), None)?;

        let is_hidden = params
            .is_hidden
            .as_ref()
            .map(|v| {
                refs.resolve(v)
                    .and_then(|v| config.hidden_flag_policy.interpret(&v))
            })
            .transpose()?;

        let remote_id = params
            .remote_id
            .as_ref()
            .map(|v| refs.resolve(v).and_then(|v| remote_id_value(&v)))
            .transpose()?;

        if let Some(declarations) = &step.references {
            check_declarations(declarations, refs)?;
        }

        Ok(Self {
            action: step.action,
            match_spec,
            parents,
            swap_with,
            priority,
            sort_field,
            sort_order,
            is_hidden,
            remote_id,
            references: step.references.clone(),
        })
    }

    pub fn declares_references(&self) -> bool {
        self.references.is_some()
    }

    pub fn has_attribute_update(&self) -> bool {
        self.priority.is_some()
            || self.sort_field.is_some()
            || self.sort_order.is_some()
            || self.remote_id.is_some()
    }
}

fn priority_value(value: &Value) -> Result<i32> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|p| i32::try_from(p).ok())
        .ok_or_else(|| StepError::invalid("priority", format!("expected an integer, got {}", value)))
}

fn identifier_value(parameter: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(StepError::invalid(
            parameter,
            format!("expected an identifier string, got {}", other),
        )),
    }
}

fn remote_id_value(value: &Value) -> Result<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        other => Err(StepError::invalid(
            "remote_id",
            format!("expected a non-empty string, got {}", other),
        )),
    }
}

/// Attributes must be extractable and identifiers bindable, all before the
/// step mutates anything
fn check_declarations(declarations: &[ReferenceDeclaration], refs: &ReferenceStore) -> Result<()> {
    let mut seen = BTreeSet::new();
    for declaration in declarations {
        if !is_supported_attribute(&declaration.attribute) {
            return Err(StepError::UnsupportedReferenceAttribute {
                attribute: declaration.attribute.clone(),
            });
        }
        refs.ensure_bindable(&declaration.identifier)?;
        if !seen.insert(declaration.identifier.as_str())
            && refs.policy() == crate::config::ReferencePolicy::FailOnDuplicate
        {
            return Err(StepError::DuplicateReference {
                identifier: declaration.identifier.clone(),
            });
        }
    }
    Ok(())
}
