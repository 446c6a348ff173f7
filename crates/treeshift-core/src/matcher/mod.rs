//! Matcher seams
//!
//! The executor never queries the tree directly. It hands a resolved match
//! specification to a `NodeMatcher` or `ContentMatcher` and works on the
//! ordered result.

pub mod criteria;

use serde_json::Value;

use crate::errors::{Result, StepError};
use crate::model::{ContentInfo, MatchSpec, Node, NodeSet};

pub use criteria::{Criterion, Scope};

/// A single-node key: numeric id or remote id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Id(i64),
    RemoteId(String),
}

impl NodeKey {
    /// Interpret a resolved value as a key
    ///
    /// Integers and all-digit strings are ids; any other non-empty string is a
    /// remote id.
    pub fn from_value(value: &Value, parameter: &str) -> Result<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(NodeKey::Id).ok_or_else(|| {
                StepError::invalid(parameter, format!("{} is not an integer id", n))
            }),
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
                .parse()
                .map(NodeKey::Id)
                .map_err(|_| StepError::invalid(parameter, format!("{} is out of range", s))),
            Value::String(s) if !s.trim().is_empty() => Ok(NodeKey::RemoteId(s.clone())),
            other => Err(StepError::invalid(
                parameter,
                format!("expected a location id or remote id, got {}", other),
            )),
        }
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKey::Id(id) => write!(f, "{}", id),
            NodeKey::RemoteId(remote_id) => f.write_str(remote_id),
        }
    }
}

/// Resolves location match specifications
pub trait NodeMatcher {
    /// All locations satisfying every condition in `criteria`
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// `InvalidCondition` for an unknown condition name or malformed value.
    fn match_nodes(&self, criteria: &MatchSpec) -> Result<NodeSet>;

    /// Exactly one location for `key`
    ///
    /// # Errors
    ///
    /// `NotFound` on zero matches, `AmbiguousKey` on more than one.
    fn match_one_by_key(&self, key: &NodeKey) -> Result<Node>;
}

/// Resolves content match specifications for `create`
pub trait ContentMatcher {
    fn match_content(&self, criteria: &MatchSpec) -> Result<Vec<ContentInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_from_number_and_digit_string() {
        assert_eq!(NodeKey::from_value(&json!(2), "k").unwrap(), NodeKey::Id(2));
        assert_eq!(NodeKey::from_value(&json!("42"), "k").unwrap(), NodeKey::Id(42));
    }

    #[test]
    fn test_key_from_remote_id() {
        assert_eq!(
            NodeKey::from_value(&json!("media-root"), "k").unwrap(),
            NodeKey::RemoteId("media-root".to_string())
        );
    }

    #[test]
    fn test_key_rejects_other_shapes() {
        for bad in [json!(null), json!(true), json!(""), json!([1]), json!(1.5)] {
            assert!(matches!(
                NodeKey::from_value(&bad, "parent_location"),
                Err(StepError::InvalidParameter { .. })
            ));
        }
    }
}
