//! Step execution with boundary logging.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for step execution:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The core crate uses only `tracing::debug!()` for internal details.

use serde_json::Value;
use treeshift_core::{log_op_end, log_op_error, log_op_start};
use treeshift_core::{ExError, Repository, StepExecutor, StepOutcome};

use crate::run::RunContext;
use crate::Result;

const OP: &str = "execute_step";

/// Execute one raw location step within a run
///
/// ## Arguments
///
/// - `ctx`: Run context holding the reference table and configuration
/// - `repo`: Repository the step reads from and writes to
/// - `step_index`: Zero-based position of the step in the run
/// - `raw`: Step mapping as read from the migration file
///
/// ## Returns
///
/// The step outcome: resulting nodes and identifiers bound.
///
/// ## Errors
///
/// Every core failure as an `ExError` carrying the operation name, step
/// index, run id and, when known, the step action.
pub fn execute_step(
    ctx: &mut RunContext,
    repo: &mut dyn Repository,
    step_index: usize,
    raw: &Value,
) -> Result<StepOutcome> {
    let correlation = ctx.correlate(step_index);
    log_op_start!(
        OP,
        run_id = correlation.run_id.as_str(),
        step_index = step_index as u64
    );
    let start = std::time::Instant::now();

    let config = *ctx.config();
    let outcome = StepExecutor::new(repo, ctx.references_mut(), config)
        .execute(raw)
        .map_err(|e| {
            let mut err = ExError::from(e)
                .with_op(OP)
                .with_step_index(step_index)
                .with_run_id(correlation.run_id.clone());
            if err.action().is_none() {
                if let Some(action) = raw_action(raw) {
                    err = err.with_action(action);
                }
            }
            log_op_error!(
                OP,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = correlation.run_id.as_str(),
                step_index = step_index as u64
            );
            err
        })?;

    log_op_end!(
        OP,
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = correlation.run_id.as_str(),
        step_index = step_index as u64,
        action = outcome.action.as_str(),
        result_len = outcome.nodes.len() as u64
    );

    Ok(outcome)
}

/// Mode as written in the raw step, for error context
fn raw_action(raw: &Value) -> Option<&str> {
    raw.get("mode")
        .or_else(|| raw.get("action"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_action_reads_mode_or_alias() {
        assert_eq!(raw_action(&json!({"mode": "load"})), Some("load"));
        assert_eq!(raw_action(&json!({"action": "delete"})), Some("delete"));
        assert_eq!(raw_action(&json!({"location_id": 2})), None);
        assert_eq!(raw_action(&json!("create")), None);
    }
}
