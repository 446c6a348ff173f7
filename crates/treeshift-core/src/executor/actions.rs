//! Action handlers
//!
//! Each handler receives a fully resolved step. Cardinality checks and
//! target lookups happen before the first store mutation.

use std::collections::BTreeSet;

use super::resolve::ResolvedStep;
use crate::errors::{Result, StepError};
use crate::model::{Node, NodeSet, StepAction};
use crate::sort_codec::{decode_sort_field, decode_sort_order};
use crate::store::{NodeCreateStruct, NodeUpdateStruct, Repository};

fn ensure_single_reference_target(step: &ResolvedStep, matched: usize) -> Result<()> {
    if step.declares_references() && matched > 1 {
        return Err(StepError::AmbiguousReferenceTarget {
            action: step.action.to_string(),
            matched,
        });
    }
    Ok(())
}

/// Place every matched content under every parent, content-major
pub(crate) fn create(repo: &mut dyn Repository, step: &ResolvedStep) -> Result<NodeSet> {
    let parents = step
        .parents
        .iter()
        .map(|key| repo.match_one_by_key(key))
        .collect::<Result<Vec<Node>>>()?;
    let mut seen = BTreeSet::new();
    if let Some(repeated) = parents.iter().find(|p| !seen.insert(p.id)) {
        return Err(StepError::ConflictingDirective {
            reason: format!("parent location {} is given more than once", repeated.id),
        });
    }
    let contents = repo.match_content(&step.match_spec)?;

    ensure_single_reference_target(step, contents.len() * parents.len())?;

    let sort_field = decode_sort_field(step.sort_field.as_deref(), None)?;
    let sort_order = decode_sort_order(step.sort_order.as_deref(), None)?;

    let mut created = Vec::with_capacity(contents.len() * parents.len());
    for content in &contents {
        for parent in &parents {
            let params = NodeCreateStruct {
                parent_id: parent.id,
                hidden: step.is_hidden,
                priority: step.priority,
                sort_field,
                sort_order,
            };
            created.push(repo.create_node(content.id, &params)?);
        }
    }
    tracing::debug!(
        contents = contents.len(),
        parents = parents.len(),
        created = created.len(),
        "locations created"
    );
    Ok(NodeSet::new(created))
}

pub(crate) fn load(repo: &mut dyn Repository, step: &ResolvedStep) -> Result<NodeSet> {
    let matched = repo.match_nodes(&step.match_spec)?;
    ensure_single_reference_target(step, matched.len())?;
    Ok(matched)
}

/// Attribute update, visibility, then move or swap, per matched node
pub(crate) fn update(repo: &mut dyn Repository, step: &ResolvedStep) -> Result<NodeSet> {
    let matched = repo.match_nodes(&step.match_spec)?;
    ensure_single_reference_target(step, matched.len())?;
    if step.swap_with.is_some() && matched.len() > 1 {
        return Err(StepError::ConflictingDirective {
            reason: format!(
                "swap_with_location needs exactly one matched location, {} matched",
                matched.len()
            ),
        });
    }
    if step.remote_id.is_some() && matched.len() > 1 {
        return Err(StepError::ConflictingDirective {
            reason: format!(
                "remote_id is unique per location, {} locations matched",
                matched.len()
            ),
        });
    }

    let new_parent = step
        .parents
        .first()
        .map(|key| repo.match_one_by_key(key))
        .transpose()?;
    let swap_target = step
        .swap_with
        .as_ref()
        .map(|key| repo.match_one_by_key(key))
        .transpose()?;
    for node in matched.iter() {
        if let Some(parent) = &new_parent {
            check_move(node, parent)?;
        } else if let Some(other) = &swap_target {
            check_swap(node, other)?;
        }
    }

    let mut updated = Vec::with_capacity(matched.len());
    for mut node in matched {
        if step.has_attribute_update() {
            let params = NodeUpdateStruct {
                priority: step.priority,
                sort_field: decode_sort_field(step.sort_field.as_deref(), Some(node.sort_field))?,
                sort_order: decode_sort_order(step.sort_order.as_deref(), Some(node.sort_order))?,
                remote_id: step.remote_id.clone(),
            };
            node = repo.update_node(&node, &params)?;
        }

        match step.is_hidden {
            Some(true) => node = repo.hide_node(&node)?,
            Some(false) => node = repo.unhide_node(&node)?,
            None => {}
        }

        if let Some(parent) = &new_parent {
            repo.move_subtree(&node, parent)?;
            node = repo.load_node(node.id)?;
        } else if let Some(other) = &swap_target {
            repo.swap_nodes(&node, other)?;
            node = repo.load_node(node.id)?;
        }

        updated.push(node);
    }
    Ok(NodeSet::new(updated))
}

fn illegal_move(node: &Node, reason: impl Into<String>) -> StepError {
    StepError::IllegalMove {
        location_id: node.id,
        reason: reason.into(),
    }
}

fn check_move(node: &Node, new_parent: &Node) -> Result<()> {
    if node.is_root() {
        return Err(illegal_move(node, "the tree root cannot be moved"));
    }
    if new_parent.is_in_subtree_of(node.id) {
        return Err(illegal_move(
            node,
            format!("target parent {} is inside the moved subtree", new_parent.id),
        ));
    }
    Ok(())
}

fn check_swap(node: &Node, other: &Node) -> Result<()> {
    if node.id == other.id {
        return Err(illegal_move(node, "cannot swap a location with itself"));
    }
    if node.is_root() || other.is_root() {
        return Err(illegal_move(node, "the tree root cannot be swapped"));
    }
    if node.is_in_subtree_of(other.id) || other.is_in_subtree_of(node.id) {
        return Err(illegal_move(
            node,
            format!("locations {} and {} are in the same branch", node.id, other.id),
        ));
    }
    Ok(())
}

/// Delete every matched subtree; returns the nodes as they were matched
pub(crate) fn delete(repo: &mut dyn Repository, step: &ResolvedStep) -> Result<NodeSet> {
    let matched = repo.match_nodes(&step.match_spec)?;
    for node in &matched {
        match repo.load_node(node.id) {
            Ok(current) => repo.delete_node(&current)?,
            // removed together with an ancestor matched earlier in this step
            Err(StepError::NotFound { .. }) => {
                tracing::debug!(location_id = node.id, "location already deleted");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(matched)
}

pub(crate) fn dispatch(repo: &mut dyn Repository, step: &ResolvedStep) -> Result<NodeSet> {
    match step.action {
        StepAction::Create => create(repo, step),
        StepAction::Load => load(repo, step),
        StepAction::Update => update(repo, step),
        StepAction::Delete => delete(repo, step),
    }
}
