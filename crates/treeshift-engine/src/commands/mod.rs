//! Command layer.
//!
//! Functions here coordinate the core executor with the run context and
//! own lifecycle logging for their operation.

pub mod step;
