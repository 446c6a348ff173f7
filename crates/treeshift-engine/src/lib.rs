//! TreeShift Engine - step boundary layer
//!
//! Wraps the core step executor with run context, lifecycle logging and
//! canonical `ExError` mapping. Sequencing steps and loading step files
//! stay with the caller.

pub mod commands;
pub mod run;

pub use commands::step::execute_step;
pub use run::RunContext;

/// Result type for engine-level calls
pub type Result<T> = std::result::Result<T, treeshift_core::ExError>;
