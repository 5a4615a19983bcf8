//! Projection of payload files into the project root
//!
//! - **planner**: resolves manifest rules into concrete [`ProjectionAction`]s
//! - **applier**: decides per action whether to create, update, skip or notify

mod applier;
mod planner;

pub use applier::{Decision, ProjectionApplier, ProjectionOutcome, ProjectionReport, decide};
pub use planner::{LifecyclePhase, ProjectionAction, plan};
