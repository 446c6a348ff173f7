//! Step intake
//!
//! One pass from a raw step mapping to the canonical `StepDescription`.
//! Legacy spellings (`location_id`, `object_id`, `parent_location_id`, ...)
//! are folded here and nowhere else.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{Result, StepError};
use crate::model::{MatchSpec, ReferenceDeclaration, StepAction, StepDescription, StepParameters};

/// The only step type this executor accepts
pub const STEP_TYPE: &str = "location";

/// Raw step document as it arrives from a migration file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStep {
    #[serde(rename = "type")]
    step_type: Option<String>,

    #[serde(alias = "action")]
    mode: Option<String>,

    #[serde(rename = "match")]
    match_spec: Option<Value>,

    /// Legacy single-location match (load, update, delete)
    location_id: Option<Value>,

    /// Legacy content match by id (create)
    object_id: Option<Value>,

    /// Content remote id on create, new location remote id on update
    remote_id: Option<Value>,

    parent_location: Option<Value>,

    /// Legacy spelling of `parent_location`
    parent_location_id: Option<Value>,

    swap_with_location: Option<Value>,
    priority: Option<Value>,
    sort_field: Option<Value>,
    sort_order: Option<Value>,
    is_hidden: Option<Value>,
    references: Option<Value>,
}

/// Normalize a raw step into its canonical description
///
/// # Errors
///
/// - `InvalidParameter` if the step is not a mapping or a field has the
///   wrong shape
/// - `UnsupportedStepType` for a `type` other than `location`
/// - `UnsupportedAction` for an unknown mode
/// - `MissingParameter` for an absent mode, match or create parent
/// - `ConflictingDirective` if both parent spellings are given
/// - `UnsupportedOperation` for references on delete
pub fn normalize_step(raw: &Value) -> Result<StepDescription> {
    if !raw.is_object() {
        return Err(StepError::invalid(
            "step",
            format!("expected a mapping, got {}", raw),
        ));
    }
    let raw: RawStep = serde_json::from_value(raw.clone())
        .map_err(|e| StepError::invalid("step", e.to_string()))?;

    if let Some(step_type) = raw.step_type.as_deref() {
        if step_type != STEP_TYPE {
            return Err(StepError::UnsupportedStepType {
                step_type: step_type.to_string(),
            });
        }
    }

    let action = match raw.mode.as_deref() {
        Some(mode) => StepAction::parse(mode)?,
        None => return Err(StepError::missing("step", "mode", "every step needs a mode")),
    };

    let match_spec = fold_match(action, &raw)?;
    let parent_targets = fold_parents(action, &raw)?;
    let references = parse_references(raw.references.as_ref())?;

    if action == StepAction::Delete && references.is_some() {
        return Err(StepError::UnsupportedOperation {
            reason: "references cannot be set on delete".to_string(),
        });
    }

    let parameters = match action {
        StepAction::Create => StepParameters {
            parent_targets,
            priority: raw.priority,
            sort_field: raw.sort_field,
            sort_order: raw.sort_order,
            is_hidden: raw.is_hidden,
            ..StepParameters::default()
        },
        StepAction::Update => StepParameters {
            parent_targets,
            swap_with: raw.swap_with_location,
            priority: raw.priority,
            sort_field: raw.sort_field,
            sort_order: raw.sort_order,
            is_hidden: raw.is_hidden,
            remote_id: raw.remote_id,
        },
        StepAction::Load | StepAction::Delete => StepParameters::default(),
    };

    Ok(StepDescription {
        action,
        match_spec,
        parameters,
        references,
    })
}

fn fold_match(action: StepAction, raw: &RawStep) -> Result<MatchSpec> {
    if let Some(value) = &raw.match_spec {
        let Value::Object(spec) = value else {
            return Err(StepError::invalid(
                "match",
                format!("expected a mapping, got {}", value),
            ));
        };
        if spec.is_empty() {
            return Err(StepError::missing(action.as_str(), "match", "match is empty"));
        }
        return Ok(spec.clone());
    }

    let legacy = match action {
        StepAction::Create => raw
            .object_id
            .as_ref()
            .map(|v| ("content_id", v))
            .or_else(|| raw.remote_id.as_ref().map(|v| ("content_remote_id", v))),
        _ => raw.location_id.as_ref().map(|v| ("location_id", v)),
    };

    match legacy {
        Some((condition, value)) => {
            let mut spec = Map::new();
            spec.insert(condition.to_string(), value.clone());
            Ok(spec)
        }
        None if action == StepAction::Create => Err(StepError::missing(
            action.as_str(),
            "match",
            "no match, object_id or remote_id to select content",
        )),
        None => Err(StepError::missing(
            action.as_str(),
            "match",
            "no match or location_id to select locations",
        )),
    }
}

fn fold_parents(action: StepAction, raw: &RawStep) -> Result<Vec<Value>> {
    let parent = match (&raw.parent_location, &raw.parent_location_id) {
        (Some(_), Some(_)) => {
            return Err(StepError::ConflictingDirective {
                reason: "both parent_location and parent_location_id are given".to_string(),
            })
        }
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    };

    let targets = match parent {
        Some(Value::Array(items)) => items.clone(),
        // keyed lists contribute their values, keys are ignored
        Some(Value::Object(entries)) => entries.values().cloned().collect(),
        Some(value) => vec![value.clone()],
        None => Vec::new(),
    };

    if action == StepAction::Create && targets.is_empty() {
        return Err(StepError::missing(
            action.as_str(),
            "parent_location",
            "a parent location is required to create a location",
        ));
    }
    Ok(targets)
}

fn parse_references(value: Option<&Value>) -> Result<Option<Vec<ReferenceDeclaration>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let declarations: Vec<ReferenceDeclaration> = serde_json::from_value(value.clone())
        .map_err(|e| {
            StepError::invalid(
                "references",
                format!("expected a list of {{attribute, identifier}}: {}", e),
            )
        })?;
    Ok(Some(declarations))
}
