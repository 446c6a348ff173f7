#![allow(clippy::unwrap_used, clippy::expect_used)]

use treeshift_core::errors::{ExErrorKind, StepError};
use treeshift_core::logging_facility::test_capture::init_test_capture;
use treeshift_core::{log_op_end, log_op_error, log_op_start};
use treeshift_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, step_index = 2u64);

    let starts = capture.events_for(op_name, EVENT_START);
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].field("step_index"), Some("2"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let ends = capture.events_for(op_name, EVENT_END);
    assert_eq!(ends.len(), 1, "Should have exactly one end event");
    assert_eq!(ends[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_kind_and_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = StepError::UnresolvedReference {
        identifier: "parent".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 5);

    let errors = capture.events_for(op_name, EVENT_END_ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].field("err_code"),
        Some(ExErrorKind::UnresolvedReference.code())
    );
    assert_eq!(
        errors[0].field("err_kind"),
        Some(format!("{:?}", ExErrorKind::UnresolvedReference).as_str())
    );
}

#[test]
fn test_executor_details_stay_at_debug() {
    let capture = init_test_capture();
    let mut refs = treeshift_core::ReferenceStore::new();

    refs.bind("debug_level_probe", serde_json::json!(1)).unwrap();

    let bound = capture.count_events(|e| {
        e.field("reference_id") == Some("debug_level_probe") && e.level == tracing::Level::DEBUG
    });
    assert_eq!(bound, 1);
}
