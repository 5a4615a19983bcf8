//! SyncEngine for keeping the local payload copy in step with its source
//!
//! This module provides:
//! - **overlay**: copy a payload onto the local copy and report what changed
//! - **initialize**: first-time setup of `.methodology` and the project root
//! - **update**: drift-aware re-sync from the recorded source

mod engine;
mod report;

pub use engine::SyncEngine;
pub use report::{InitReport, UpdateReport};
