use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, StepError};

/// Mapping of condition name to a scalar or list value
///
/// Values may still contain `reference:` tokens until the step is resolved.
pub type MatchSpec = Map<String, Value>;

/// The four location actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Create,
    Load,
    Update,
    Delete,
}

impl StepAction {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(StepAction::Create),
            "load" => Ok(StepAction::Load),
            "update" => Ok(StepAction::Update),
            "delete" => Ok(StepAction::Delete),
            other => Err(StepError::UnsupportedAction {
                action: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Create => "create",
            StepAction::Load => "load",
            StepAction::Update => "update",
            StepAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{attribute, identifier}` entry of a step's `references` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDeclaration {
    pub attribute: String,
    pub identifier: String,
}

impl ReferenceDeclaration {
    pub fn new(attribute: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            identifier: identifier.into(),
        }
    }
}

/// Action parameters in canonical form, still unresolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepParameters {
    /// Parent keys for create (one or many) or the move target for update
    pub parent_targets: Vec<Value>,
    pub swap_with: Option<Value>,
    pub priority: Option<Value>,
    pub sort_field: Option<Value>,
    pub sort_order: Option<Value>,
    pub is_hidden: Option<Value>,
    /// New remote id of the node (update only)
    pub remote_id: Option<Value>,
}

/// Canonical step description
///
/// Produced once by normalization; legacy field spellings never reach the
/// action handlers. For `create` the match selects content, for every other
/// action it selects locations.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDescription {
    pub action: StepAction,
    pub match_spec: MatchSpec,
    pub parameters: StepParameters,
    /// `None` means the step has no references section at all
    pub references: Option<Vec<ReferenceDeclaration>>,
}

impl StepDescription {
    pub fn declares_references(&self) -> bool {
        self.references.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_round_trip() {
        for action in [
            StepAction::Create,
            StepAction::Load,
            StepAction::Update,
            StepAction::Delete,
        ] {
            assert_eq!(StepAction::parse(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_action() {
        let err = StepAction::parse("copy").unwrap_err();
        assert!(matches!(err, StepError::UnsupportedAction { .. }));
    }
}
