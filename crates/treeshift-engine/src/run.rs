//! Run-scoped state

use treeshift_core::{ExecutorConfig, ReferenceStore};
use treeshift_core_types::{RunId, StepCorrelation};

/// State shared by every step of one migration run
///
/// Owns the reference table; concurrent runs each need their own context.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: RunId,
    config: ExecutorConfig,
    references: ReferenceStore,
}

impl RunContext {
    pub fn new(config: ExecutorConfig) -> Self {
        Self::with_run_id(RunId::new(), config)
    }

    pub fn with_run_id(run_id: RunId, config: ExecutorConfig) -> Self {
        Self {
            run_id,
            config,
            references: ReferenceStore::with_policy(config.reference_policy),
        }
    }

    /// Context configured from `TREESHIFT_*` environment variables
    pub fn from_env() -> Self {
        Self::new(ExecutorConfig::from_env())
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn references(&self) -> &ReferenceStore {
        &self.references
    }

    pub fn references_mut(&mut self) -> &mut ReferenceStore {
        &mut self.references
    }

    pub fn correlate(&self, step_index: usize) -> StepCorrelation {
        StepCorrelation::new(self.run_id.clone(), step_index)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}
