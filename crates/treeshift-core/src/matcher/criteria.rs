//! Typed match criteria
//!
//! A resolved `MatchSpec` is parsed into a `Criterion` tree once, so unknown
//! condition names and malformed values fail before any store is queried.
//! Top-level conditions are AND-combined; a list value means any-of.

use serde_json::Value;

use crate::errors::{Result, StepError};
use crate::model::MatchSpec;

/// Which matcher a specification is parsed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Node,
    Content,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    LocationId(Vec<i64>),
    LocationRemoteId(Vec<String>),
    ParentLocationId(Vec<i64>),
    ParentLocationRemoteId(Vec<String>),
    ContentId(Vec<i64>),
    ContentRemoteId(Vec<String>),
    ContentTypeId(Vec<i64>),
    ContentTypeIdentifier(Vec<String>),
    /// Location is the given node or one of its descendants
    Subtree(Vec<i64>),
    IsHidden(bool),
    And(Vec<Criterion>),
    Or(Vec<Criterion>),
}

const NODE_CONDITIONS: &[&str] = &[
    "location_id",
    "location_remote_id",
    "parent_location_id",
    "parent_location_remote_id",
    "content_id",
    "content_remote_id",
    "content_type_id",
    "content_type_identifier",
    "subtree",
    "is_hidden",
    "and",
    "or",
];

const CONTENT_CONDITIONS: &[&str] = &[
    "content_id",
    "content_remote_id",
    "content_type_id",
    "content_type_identifier",
    "location_id",
    "parent_location_id",
    "and",
    "or",
];

impl Scope {
    fn allows(self, condition: &str) -> bool {
        match self {
            Scope::Node => NODE_CONDITIONS.contains(&condition),
            Scope::Content => CONTENT_CONDITIONS.contains(&condition),
        }
    }
}

/// Facts a criterion is evaluated against
///
/// A location exposes one value per fact; a content item exposes the union
/// over all of its locations.
pub trait MatchSubject {
    fn location_ids(&self) -> Vec<i64>;
    fn location_remote_ids(&self) -> Vec<String>;
    fn parent_location_ids(&self) -> Vec<i64>;
    fn parent_location_remote_ids(&self) -> Vec<String>;
    fn content_id(&self) -> i64;
    fn content_remote_id(&self) -> &str;
    fn content_type_id(&self) -> i64;
    fn content_type_identifier(&self) -> Option<&str>;
    /// Path strings of every location (`/1/2/42/`)
    fn paths(&self) -> Vec<String>;
    fn hidden(&self) -> Option<bool>;
}

impl Criterion {
    /// Parse a whole specification (implicit AND)
    ///
    /// # Errors
    ///
    /// `InvalidCondition` for names outside `scope` or malformed values.
    pub fn parse(spec: &MatchSpec, scope: Scope) -> Result<Criterion> {
        spec.iter()
            .map(|(name, value)| Self::parse_condition(name, value, scope))
            .collect::<Result<Vec<_>>>()
            .map(Criterion::And)
    }

    fn parse_condition(name: &str, value: &Value, scope: Scope) -> Result<Criterion> {
        if !scope.allows(name) {
            return Err(invalid(name, "unknown condition"));
        }
        let criterion = match name {
            "location_id" => Criterion::LocationId(int_values(name, value)?),
            "location_remote_id" => Criterion::LocationRemoteId(string_values(name, value)?),
            "parent_location_id" => Criterion::ParentLocationId(int_values(name, value)?),
            "parent_location_remote_id" => {
                Criterion::ParentLocationRemoteId(string_values(name, value)?)
            }
            "content_id" => Criterion::ContentId(int_values(name, value)?),
            "content_remote_id" => Criterion::ContentRemoteId(string_values(name, value)?),
            "content_type_id" => Criterion::ContentTypeId(int_values(name, value)?),
            "content_type_identifier" => {
                Criterion::ContentTypeIdentifier(string_values(name, value)?)
            }
            "subtree" => Criterion::Subtree(int_values(name, value)?),
            "is_hidden" => match value {
                Value::Bool(b) => Criterion::IsHidden(*b),
                _ => return Err(invalid(name, "expected a boolean")),
            },
            "and" => Criterion::And(nested(name, value, scope)?),
            "or" => Criterion::Or(nested(name, value, scope)?),
            _ => return Err(invalid(name, "unknown condition")),
        };
        Ok(criterion)
    }

    pub fn matches(&self, subject: &dyn MatchSubject) -> bool {
        match self {
            Criterion::LocationId(ids) => any_in(&subject.location_ids(), ids),
            Criterion::LocationRemoteId(ids) => any_in(&subject.location_remote_ids(), ids),
            Criterion::ParentLocationId(ids) => any_in(&subject.parent_location_ids(), ids),
            Criterion::ParentLocationRemoteId(ids) => {
                any_in(&subject.parent_location_remote_ids(), ids)
            }
            Criterion::ContentId(ids) => ids.contains(&subject.content_id()),
            Criterion::ContentRemoteId(ids) => {
                ids.iter().any(|id| id == subject.content_remote_id())
            }
            Criterion::ContentTypeId(ids) => ids.contains(&subject.content_type_id()),
            Criterion::ContentTypeIdentifier(identifiers) => subject
                .content_type_identifier()
                .is_some_and(|own| identifiers.iter().any(|i| i == own)),
            Criterion::Subtree(roots) => subject.paths().iter().any(|path| {
                roots
                    .iter()
                    .any(|root| path.contains(&format!("/{}/", root)))
            }),
            Criterion::IsHidden(wanted) => subject.hidden() == Some(*wanted),
            Criterion::And(all) => all.iter().all(|c| c.matches(subject)),
            Criterion::Or(any) => any.iter().any(|c| c.matches(subject)),
        }
    }
}

fn invalid(condition: &str, reason: impl Into<String>) -> StepError {
    StepError::InvalidCondition {
        condition: condition.to_string(),
        reason: reason.into(),
    }
}

fn any_in<T: PartialEq>(own: &[T], wanted: &[T]) -> bool {
    own.iter().any(|v| wanted.contains(v))
}

fn scalars<'a>(condition: &str, value: &'a Value) -> Result<Vec<&'a Value>> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        scalar => vec![scalar],
    };
    if items.is_empty() {
        return Err(invalid(condition, "empty value list"));
    }
    Ok(items)
}

fn int_values(condition: &str, value: &Value) -> Result<Vec<i64>> {
    scalars(condition, value)?
        .into_iter()
        .map(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .map(|parsed| parsed.ok_or_else(|| invalid(condition, format!("expected integer ids, got {}", value))))
        .collect()
}

fn string_values(condition: &str, value: &Value) -> Result<Vec<String>> {
    scalars(condition, value)?
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(invalid(condition, format!("expected strings, got {}", other))),
        })
        .collect()
}

fn nested(condition: &str, value: &Value, scope: Scope) -> Result<Vec<Criterion>> {
    let groups: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => return Err(invalid(condition, "expected a list of match specifications")),
    };
    if groups.is_empty() {
        return Err(invalid(condition, "empty value list"));
    }
    groups
        .into_iter()
        .map(|group| match group {
            Value::Object(spec) => Criterion::parse(spec, scope),
            other => Err(invalid(
                condition,
                format!("expected a match specification, got {}", other),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> MatchSpec {
        value.as_object().cloned().unwrap_or_default()
    }

    struct Fixture {
        id: i64,
        parent: i64,
        path: String,
        hidden: bool,
    }

    impl MatchSubject for Fixture {
        fn location_ids(&self) -> Vec<i64> {
            vec![self.id]
        }
        fn location_remote_ids(&self) -> Vec<String> {
            vec![format!("loc-{}", self.id)]
        }
        fn parent_location_ids(&self) -> Vec<i64> {
            vec![self.parent]
        }
        fn parent_location_remote_ids(&self) -> Vec<String> {
            vec![format!("loc-{}", self.parent)]
        }
        fn content_id(&self) -> i64 {
            self.id * 10
        }
        fn content_remote_id(&self) -> &str {
            "content"
        }
        fn content_type_id(&self) -> i64 {
            1
        }
        fn content_type_identifier(&self) -> Option<&str> {
            Some("folder")
        }
        fn paths(&self) -> Vec<String> {
            vec![self.path.clone()]
        }
        fn hidden(&self) -> Option<bool> {
            Some(self.hidden)
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            id: 42,
            parent: 2,
            path: "/1/2/42/".to_string(),
            hidden: false,
        }
    }

    #[test]
    fn test_top_level_conditions_are_and_combined() {
        let c = Criterion::parse(&spec(json!({"location_id": 42, "parent_location_id": 3})), Scope::Node)
            .unwrap();
        assert!(!c.matches(&fixture()));

        let c = Criterion::parse(&spec(json!({"location_id": 42, "parent_location_id": 2})), Scope::Node)
            .unwrap();
        assert!(c.matches(&fixture()));
    }

    #[test]
    fn test_list_values_are_any_of() {
        let c = Criterion::parse(&spec(json!({"location_id": [7, "42"]})), Scope::Node).unwrap();
        assert!(c.matches(&fixture()));
    }

    #[test]
    fn test_or_and_subtree() {
        let c = Criterion::parse(
            &spec(json!({"or": [{"location_id": 7}, {"subtree": 2, "is_hidden": false}]})),
            Scope::Node,
        )
        .unwrap();
        assert!(c.matches(&fixture()));
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let err = Criterion::parse(&spec(json!({"colour": "red"})), Scope::Node).unwrap_err();
        assert!(matches!(err, StepError::InvalidCondition { ref condition, .. } if condition == "colour"));
    }

    #[test]
    fn test_scope_limits_conditions() {
        let err = Criterion::parse(&spec(json!({"subtree": 2})), Scope::Content).unwrap_err();
        assert!(matches!(err, StepError::InvalidCondition { .. }));
    }

    #[test]
    fn test_malformed_values_rejected() {
        for bad in [
            json!({"location_id": []}),
            json!({"location_id": "abc"}),
            json!({"is_hidden": 1}),
            json!({"or": 5}),
        ] {
            assert!(Criterion::parse(&spec(bad), Scope::Node).is_err());
        }
    }
}
