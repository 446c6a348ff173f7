//! TreeShift Core - location step execution
//!
//! This crate provides everything needed to apply declarative location
//! migration steps to a content tree, including:
//! - Node, content and step models
//! - Step normalization (legacy field folding) and reference resolution
//! - Create / load / update / delete handlers with move and swap
//! - Reference extraction into a run-scoped reference store
//! - Matcher and node store seams with an in-memory repository
//! - Error and logging facilities shared with the engine crate

pub mod config;
pub mod errors;
pub mod executor;
pub mod logging_facility;
pub mod matcher;
pub mod model;
pub mod references;
pub mod sort_codec;
pub mod store;

// Re-export commonly used types
pub use config::{ExecutorConfig, HiddenFlagPolicy, ReferencePolicy};
pub use errors::{ExError, ExErrorKind, Result, StepError};
pub use executor::{normalize_step, StepExecutor, StepOutcome};
pub use matcher::{ContentMatcher, NodeKey, NodeMatcher};
pub use model::{ContentInfo, Node, NodeSet, StepAction, StepDescription};
pub use references::ReferenceStore;
pub use store::{ContentTypeLookup, MemoryRepository, NodeStore, Repository};
