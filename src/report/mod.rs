//! Run reporting for the panel pipeline.
//!
//! This module records what a run read and produced, for display at the
//! end of a run and for optional persistence next to the panel.

pub mod summary;

// Re-export commonly used types
pub use summary::{RunStats, RunSummary};
