//! Reference extraction
//!
//! Maps a declared attribute name to the value read off the single node a
//! step produced. The name table is built once per process.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::errors::{Result, StepError};
use crate::model::{Node, NodeSet, ReferenceDeclaration, StepAction};
use crate::references::ReferenceStore;
use crate::sort_codec::{encode_sort_field, encode_sort_order};
use crate::store::ContentTypeLookup;

/// How an attribute value is obtained
#[derive(Clone, Copy)]
enum Extractor {
    /// Read directly off the node
    Node(fn(&Node) -> Value),
    /// Needs one content-type lookup
    ContentTypeIdentifier,
}

fn table() -> &'static HashMap<&'static str, Extractor> {
    static TABLE: OnceLock<HashMap<&'static str, Extractor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let entries: Vec<(&'static str, Extractor)> = vec![
            ("id", Extractor::Node(|n| json!(n.id))),
            ("location_id", Extractor::Node(|n| json!(n.id))),
            ("remote_id", Extractor::Node(|n| json!(n.remote_id))),
            ("location_remote_id", Extractor::Node(|n| json!(n.remote_id))),
            (
                "always_available",
                Extractor::Node(|n| json!(n.content_info.always_available)),
            ),
            ("content_id", Extractor::Node(|n| json!(n.content_id))),
            (
                "content_type_id",
                Extractor::Node(|n| json!(n.content_info.content_type_id)),
            ),
            ("content_type_identifier", Extractor::ContentTypeIdentifier),
            (
                "current_version",
                Extractor::Node(|n| json!(n.content_info.current_version_no)),
            ),
            (
                "current_version_no",
                Extractor::Node(|n| json!(n.content_info.current_version_no)),
            ),
            ("depth", Extractor::Node(|n| json!(n.depth))),
            ("is_hidden", Extractor::Node(|n| json!(n.hidden))),
            (
                "main_location_id",
                Extractor::Node(|n| json!(n.content_info.main_location_id)),
            ),
            (
                "main_language_code",
                Extractor::Node(|n| json!(n.content_info.main_language_code)),
            ),
            (
                "modification_date",
                Extractor::Node(|n| json!(n.content_info.modification_date.timestamp())),
            ),
            ("name", Extractor::Node(|n| json!(n.content_info.name))),
            ("owner_id", Extractor::Node(|n| json!(n.content_info.owner_id))),
            ("parent_location_id", Extractor::Node(|n| json!(n.parent_id))),
            ("path", Extractor::Node(|n| json!(n.path))),
            ("position", Extractor::Node(|n| json!(n.position))),
            ("priority", Extractor::Node(|n| json!(n.priority))),
            (
                "publication_date",
                Extractor::Node(|n| json!(n.content_info.published_date.timestamp())),
            ),
            ("section_id", Extractor::Node(|n| json!(n.content_info.section_id))),
            (
                "sort_field",
                Extractor::Node(|n| json!(encode_sort_field(n.sort_field))),
            ),
            (
                "sort_order",
                Extractor::Node(|n| json!(encode_sort_order(n.sort_order))),
            ),
        ];
        entries.into_iter().collect()
    })
}

pub fn is_supported_attribute(attribute: &str) -> bool {
    table().contains_key(attribute)
}

/// Every attribute name a reference may be declared on, sorted
pub fn supported_attributes() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = table().keys().copied().collect();
    names.sort_unstable();
    names
}

/// Read one attribute off `node`
///
/// # Errors
///
/// `UnsupportedReferenceAttribute` for an unknown name; lookup failures for
/// `content_type_identifier` propagate.
pub fn extract_attribute<L>(node: &Node, attribute: &str, lookup: &L) -> Result<Value>
where
    L: ContentTypeLookup + ?Sized,
{
    match table().get(attribute) {
        Some(Extractor::Node(read)) => Ok(read(node)),
        Some(Extractor::ContentTypeIdentifier) => lookup
            .identifier_of(node.content_info.content_type_id)
            .map(Value::String),
        None => Err(StepError::UnsupportedReferenceAttribute {
            attribute: attribute.to_string(),
        }),
    }
}

/// Bind every declared reference from the step's single result node
///
/// Returns `false` when the step declares no references. All values are
/// extracted before the first binding, so a failing attribute binds nothing.
///
/// # Errors
///
/// - `AmbiguousReferenceTarget` if `nodes` holds more than one node
/// - `NoReferenceTarget` if `nodes` is empty
/// - `DuplicateReference` per the store's policy
pub fn set_references<L>(
    action: StepAction,
    declarations: Option<&[ReferenceDeclaration]>,
    nodes: &NodeSet,
    lookup: &L,
    refs: &mut ReferenceStore,
) -> Result<bool>
where
    L: ContentTypeLookup + ?Sized,
{
    let Some(declarations) = declarations else {
        return Ok(false);
    };
    let node = match nodes.as_slice() {
        [node] => node,
        [] => {
            return Err(StepError::NoReferenceTarget {
                action: action.to_string(),
            })
        }
        many => {
            return Err(StepError::AmbiguousReferenceTarget {
                action: action.to_string(),
                matched: many.len(),
            })
        }
    };

    let values = declarations
        .iter()
        .map(|d| Ok((d.identifier.clone(), extract_attribute(node, &d.attribute, lookup)?)))
        .collect::<Result<Vec<_>>>()?;

    for (identifier, value) in values {
        refs.bind(identifier, value)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentInfo, SortField, SortOrder};
    use chrono::{TimeZone, Utc};

    struct Types;

    impl ContentTypeLookup for Types {
        fn identifier_of(&self, content_type_id: i64) -> Result<String> {
            match content_type_id {
                16 => Ok("article".to_string()),
                other => Err(StepError::NotFound {
                    entity: "content type".to_string(),
                    key: other.to_string(),
                }),
            }
        }
    }

    fn node() -> Node {
        let mut content = ContentInfo::new(55, "content-55", "About us", 16);
        content.owner_id = 14;
        content.section_id = 3;
        content.main_location_id = Some(40);
        content.current_version_no = 4;
        content.always_available = true;
        content.modification_date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        content.published_date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Node {
            id: 42,
            remote_id: "loc-42".to_string(),
            parent_id: Some(2),
            path: "/1/2/42/".to_string(),
            depth: 2,
            priority: 7,
            sort_field: SortField::Published,
            sort_order: SortOrder::Desc,
            hidden: true,
            position: 3,
            content_id: 55,
            content_info: content,
        }
    }

    #[test]
    fn test_every_attribute_extracts() {
        let cases: Vec<(&str, Value)> = vec![
            ("id", json!(42)),
            ("location_id", json!(42)),
            ("remote_id", json!("loc-42")),
            ("location_remote_id", json!("loc-42")),
            ("always_available", json!(true)),
            ("content_id", json!(55)),
            ("content_type_id", json!(16)),
            ("content_type_identifier", json!("article")),
            ("current_version", json!(4)),
            ("current_version_no", json!(4)),
            ("depth", json!(2)),
            ("is_hidden", json!(true)),
            ("main_location_id", json!(40)),
            ("main_language_code", json!("eng-GB")),
            ("modification_date", json!(1_704_164_645)),
            ("name", json!("About us")),
            ("owner_id", json!(14)),
            ("parent_location_id", json!(2)),
            ("path", json!("/1/2/42/")),
            ("position", json!(3)),
            ("priority", json!(7)),
            ("publication_date", json!(1_577_836_800)),
            ("section_id", json!(3)),
            ("sort_field", json!("published")),
            ("sort_order", json!("DESC")),
        ];
        assert_eq!(cases.len(), supported_attributes().len());

        let node = node();
        for (attribute, expected) in cases {
            assert_eq!(
                extract_attribute(&node, attribute, &Types).unwrap(),
                expected,
                "attribute {}",
                attribute
            );
        }
    }

    #[test]
    fn test_unknown_attribute() {
        let err = extract_attribute(&node(), "colour", &Types).unwrap_err();
        assert!(matches!(err, StepError::UnsupportedReferenceAttribute { .. }));
    }

    #[test]
    fn test_no_declarations_is_noop() {
        let mut refs = ReferenceStore::new();
        let nodes = NodeSet::new(vec![node(), node()]);
        assert!(!set_references(StepAction::Load, None, &nodes, &Types, &mut refs).unwrap());
        assert!(refs.is_empty());
    }

    #[test]
    fn test_operand_cardinality() {
        let mut refs = ReferenceStore::new();
        let decls = vec![ReferenceDeclaration::new("id", "x")];

        let many = NodeSet::new(vec![node(), node()]);
        assert!(matches!(
            set_references(StepAction::Load, Some(&decls), &many, &Types, &mut refs),
            Err(StepError::AmbiguousReferenceTarget { matched: 2, .. })
        ));

        let none = NodeSet::default();
        assert!(matches!(
            set_references(StepAction::Update, Some(&decls), &none, &Types, &mut refs),
            Err(StepError::NoReferenceTarget { .. })
        ));
        assert!(refs.is_empty());
    }

    #[test]
    fn test_failed_lookup_binds_nothing() {
        let mut refs = ReferenceStore::new();
        let mut n = node();
        n.content_info.content_type_id = 99;
        let decls = vec![
            ReferenceDeclaration::new("id", "first"),
            ReferenceDeclaration::new("content_type_identifier", "kind"),
        ];
        let result = set_references(
            StepAction::Load,
            Some(&decls),
            &NodeSet::new(vec![n]),
            &Types,
            &mut refs,
        );
        assert!(result.is_err());
        assert!(!refs.contains("first"));
    }
}
