//! Location step executor
//!
//! Runs one step at a time against a repository:
//!
//! 1. normalize the raw mapping into a canonical `StepDescription`
//! 2. resolve reference tokens and type every parameter
//! 3. match, validate directive combinations, mutate
//! 4. extract declared references from the single result node
//!
//! The executor borrows the repository and the run's reference store; it
//! owns neither and keeps no state between steps.

mod actions;
pub mod extraction;
pub mod normalize;
mod resolve;

use serde_json::Value;

use crate::config::ExecutorConfig;
use crate::errors::Result;
use crate::model::{NodeSet, StepAction, StepDescription};
use crate::references::ReferenceStore;
use crate::store::Repository;

pub use extraction::{extract_attribute, set_references, supported_attributes};
pub use normalize::{normalize_step, STEP_TYPE};

/// Result of one executed step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub action: StepAction,
    /// Created, loaded or updated nodes; for delete, the nodes as they were
    /// before deletion
    pub nodes: NodeSet,
    /// Identifiers bound by this step, in declaration order
    pub bound: Vec<String>,
}

pub struct StepExecutor<'a> {
    repo: &'a mut dyn Repository,
    refs: &'a mut ReferenceStore,
    config: ExecutorConfig,
}

impl<'a> StepExecutor<'a> {
    pub fn new(
        repo: &'a mut dyn Repository,
        refs: &'a mut ReferenceStore,
        config: ExecutorConfig,
    ) -> Self {
        Self { repo, refs, config }
    }

    /// Normalize and execute a raw step mapping
    pub fn execute(&mut self, raw: &Value) -> Result<StepOutcome> {
        let step = normalize_step(raw)?;
        self.execute_step(&step)
    }

    /// Execute an already canonical step
    ///
    /// # Errors
    ///
    /// Any validation, matching or store error. Validation errors are raised
    /// before the first mutating store call; a store error aborts the step
    /// where it happened.
    pub fn execute_step(&mut self, step: &StepDescription) -> Result<StepOutcome> {
        let resolved = resolve::ResolvedStep::resolve(step, self.refs, &self.config)?;
        let nodes = actions::dispatch(&mut *self.repo, &resolved)?;

        let declarations = match step.action {
            StepAction::Delete => None,
            _ => step.references.as_deref(),
        };
        let bound = if set_references(step.action, declarations, &nodes, &*self.repo, self.refs)? {
            declarations
                .unwrap_or_default()
                .iter()
                .map(|d| d.identifier.clone())
                .collect()
        } else {
            Vec::new()
        };

        tracing::debug!(
            action = %step.action,
            nodes = nodes.len(),
            bound = bound.len(),
            "step executed"
        );
        Ok(StepOutcome {
            action: step.action,
            nodes,
            bound,
        })
    }
}
