/// Location load and delete steps
mod common;

use common::{fixture_repository, run};
use serde_json::json;
use treeshift_core::store::Mutation;
use treeshift_core::{ReferenceStore, StepError};

#[test]
fn test_load_binds_attributes_without_mutating() {
    // GIVEN location 11 holding an article
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    // WHEN loading it with several references
    let outcome = run(
        &mut repo,
        &mut refs,
        json!({
            "mode": "load",
            "match": {"location_remote_id": "location-11"},
            "references": [
                {"attribute": "path", "identifier": "item_path"},
                {"attribute": "content_type_identifier", "identifier": "item_type"},
                {"attribute": "parent_location_id", "identifier": "item_parent"}
            ]
        }),
    )
    .unwrap();

    // THEN every reference is bound and the store was not written
    assert_eq!(outcome.nodes.ids(), vec![11]);
    assert_eq!(refs.get("item_path"), Some(&json!("/1/2/10/11/")));
    assert_eq!(refs.get("item_type"), Some(&json!("article")));
    assert_eq!(refs.get("item_parent"), Some(&json!(10)));
    assert!(repo.journal().is_empty());
}

#[test]
fn test_load_multi_match_with_references_fails() {
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    let err = run(
        &mut repo,
        &mut refs,
        json!({
            "mode": "load",
            "match": {"subtree": 2},
            "references": [{"attribute": "id", "identifier": "one"}]
        }),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StepError::AmbiguousReferenceTarget { matched: 3, .. }
    ));
    assert!(refs.is_empty());
}

#[test]
fn test_load_without_references_returns_every_match() {
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    let outcome = run(
        &mut repo,
        &mut refs,
        json!({"mode": "load", "match": {"or": [{"location_id": 20}, {"content_type_identifier": "article"}]}}),
    )
    .unwrap();

    assert_eq!(outcome.nodes.ids(), vec![11, 20]);
    assert!(outcome.bound.is_empty());
}

#[test]
fn test_load_zero_matches_with_references_fails() {
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    let err = run(
        &mut repo,
        &mut refs,
        json!({
            "mode": "load",
            "location_id": 404,
            "references": [{"attribute": "id", "identifier": "missing"}]
        }),
    )
    .unwrap_err();

    assert!(matches!(err, StepError::NoReferenceTarget { .. }));
}

#[test]
fn test_delete_returns_pre_deletion_node() {
    // GIVEN location 10 with child 11
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    // WHEN deleting 10
    let outcome = run(
        &mut repo,
        &mut refs,
        json!({"mode": "delete", "match": {"location_id": 10}}),
    )
    .unwrap();

    // THEN the returned node is the one that was removed
    let node = outcome.nodes.first().unwrap();
    assert_eq!(node.id, 10);
    assert_eq!(node.path, "/1/2/10/");

    // AND the subtree is gone
    assert!(!repo.contains_location(10));
    assert!(!repo.contains_location(11));
    assert_eq!(repo.journal(), &[Mutation::Delete { location_id: 10 }]);
}

#[test]
fn test_delete_overlapping_matches_deletes_once() {
    // GIVEN a match hitting 10 and its descendant 11
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    // WHEN deleting both
    let outcome = run(
        &mut repo,
        &mut refs,
        json!({"mode": "delete", "match": {"subtree": 10}}),
    )
    .unwrap();

    // THEN both are reported, one store delete happened
    assert_eq!(outcome.nodes.ids(), vec![10, 11]);
    assert_eq!(repo.journal(), &[Mutation::Delete { location_id: 10 }]);
}

#[test]
fn test_delete_unknown_condition_fails() {
    let mut repo = fixture_repository();
    let mut refs = ReferenceStore::new();

    let err = run(
        &mut repo,
        &mut refs,
        json!({"mode": "delete", "match": {"colour": "red"}}),
    )
    .unwrap_err();

    assert!(matches!(err, StepError::InvalidCondition { .. }));
    assert_eq!(repo.location_count(), 5);
}
