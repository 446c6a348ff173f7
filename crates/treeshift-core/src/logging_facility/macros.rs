//! Lifecycle logging macros
//!
//! Each event carries `component`, `op` and `event`, so a consumer can pair
//! the start and end records of one step. Extra `key = value` fields follow
//! tracing's field syntax.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Operation started
///
/// ```
/// # use treeshift_core::log_op_start;
/// log_op_start!("execute_step");
/// log_op_start!("execute_step", step_index = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            treeshift_core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Operation finished; `duration_ms` is mandatory
///
/// ```
/// # use treeshift_core::log_op_end;
/// log_op_end!("execute_step", duration_ms = 42u64, result_len = 1u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            treeshift_core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Operation failed
///
/// `$err` is anything convertible into `ExError`; its kind, code and
/// entity id (if any) are logged.
///
/// ```
/// # use treeshift_core::log_op_error;
/// # use treeshift_core::errors::StepError;
/// let err = StepError::UnresolvedReference { identifier: "parent".to_string() };
/// log_op_error!("execute_step", err, duration_ms = 10u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            treeshift_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_entity = ex_err.entity_id().unwrap_or_default()
            $(, $($field)*)?
        )
    }};
}
