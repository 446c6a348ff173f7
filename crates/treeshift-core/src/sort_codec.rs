//! Translation between human sort identifiers and internal ordering codes
//!
//! Input identifiers are case-insensitive. Output is canonical: lowercase
//! field names, uppercase `ASC` / `DESC`.

use crate::errors::{Result, StepError};
use crate::model::{SortField, SortOrder};

const SORT_FIELDS: &[(&str, SortField)] = &[
    ("path", SortField::Path),
    ("published", SortField::Published),
    ("modified", SortField::Modified),
    ("section", SortField::Section),
    ("depth", SortField::Depth),
    ("class_identifier", SortField::ClassIdentifier),
    ("class_name", SortField::ClassName),
    ("priority", SortField::Priority),
    ("name", SortField::Name),
    ("modified_subnode", SortField::ModifiedSubnode),
    ("node_id", SortField::NodeId),
    ("contentobject_id", SortField::ContentObjectId),
];

const SORT_ORDERS: &[(&str, SortOrder)] = &[("ASC", SortOrder::Asc), ("DESC", SortOrder::Desc)];

/// Decode a sort field identifier
///
/// Returns `current` unchanged when `new_value` is absent.
///
/// # Errors
///
/// `UnknownSortField` for an unrecognized identifier.
pub fn decode_sort_field(
    new_value: Option<&str>,
    current: Option<SortField>,
) -> Result<Option<SortField>> {
    let Some(raw) = new_value else {
        return Ok(current);
    };
    let wanted = raw.trim().to_ascii_lowercase();
    SORT_FIELDS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, field)| Some(*field))
        .ok_or_else(|| StepError::UnknownSortField {
            value: raw.to_string(),
        })
}

/// Decode a sort order identifier
///
/// # Errors
///
/// `UnknownSortOrder` for anything other than `ASC` / `DESC`.
pub fn decode_sort_order(
    new_value: Option<&str>,
    current: Option<SortOrder>,
) -> Result<Option<SortOrder>> {
    let Some(raw) = new_value else {
        return Ok(current);
    };
    let wanted = raw.trim().to_ascii_uppercase();
    SORT_ORDERS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, order)| Some(*order))
        .ok_or_else(|| StepError::UnknownSortOrder {
            value: raw.to_string(),
        })
}

pub fn encode_sort_field(field: SortField) -> &'static str {
    SORT_FIELDS
        .iter()
        .find(|(_, f)| *f == field)
        .map(|(name, _)| *name)
        // every variant is listed in SORT_FIELDS
        .unwrap_or("path")
}

pub fn encode_sort_order(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_covers_every_field() {
        for field in SortField::ALL {
            let name = encode_sort_field(field);
            assert_eq!(decode_sort_field(Some(name), None).unwrap(), Some(field));
        }
        assert_eq!(SORT_FIELDS.len(), SortField::ALL.len());
    }

    #[test]
    fn test_absent_value_keeps_current() {
        assert_eq!(
            decode_sort_field(None, Some(SortField::Priority)).unwrap(),
            Some(SortField::Priority)
        );
        assert_eq!(decode_sort_field(None, None).unwrap(), None);
        assert_eq!(
            decode_sort_order(None, Some(SortOrder::Desc)).unwrap(),
            Some(SortOrder::Desc)
        );
    }

    #[test]
    fn test_case_insensitive_input() {
        assert_eq!(
            decode_sort_field(Some("PUBLISHED"), None).unwrap(),
            Some(SortField::Published)
        );
        assert_eq!(
            decode_sort_order(Some("asc"), None).unwrap(),
            Some(SortOrder::Asc)
        );
    }

    #[test]
    fn test_unknown_identifiers() {
        assert!(matches!(
            decode_sort_field(Some("title"), Some(SortField::Name)),
            Err(StepError::UnknownSortField { .. })
        ));
        assert!(matches!(
            decode_sort_order(Some("up"), None),
            Err(StepError::UnknownSortOrder { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_sort_field_round_trip(index in 0usize..SORT_FIELDS.len()) {
            let name = SORT_FIELDS[index].0;
            let decoded = decode_sort_field(Some(name), None).unwrap().unwrap();
            prop_assert_eq!(encode_sort_field(decoded), name);
        }

        #[test]
        fn prop_absent_field_returns_current(code in 1u8..=12) {
            let current = SortField::from_code(code);
            prop_assert_eq!(decode_sort_field(None, current).unwrap(), current);
        }

        #[test]
        fn prop_sort_order_round_trip(asc in any::<bool>()) {
            let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
            let encoded = encode_sort_order(order);
            prop_assert_eq!(decode_sort_order(Some(encoded), None).unwrap(), Some(order));
        }

        #[test]
        fn prop_unknown_field_rejected(raw in "[a-z]{1,3}") {
            prop_assume!(!SORT_FIELDS.iter().any(|(name, _)| *name == raw));
            prop_assert!(decode_sort_field(Some(&raw), None).is_err());
        }
    }
}
