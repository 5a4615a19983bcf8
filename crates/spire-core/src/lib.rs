//! Methodology payload sync engine for Spire
//!
//! This crate keeps a local, editable copy of an upstream methodology payload
//! inside a project and projects parts of it into the project root:
//!
//! - **Snapshots**: content-addressed maps of the payload tree
//! - **Sync state**: the snapshot recorded after the last successful sync
//! - **Source resolution**: local directories or downloaded, safely extracted tarballs
//! - **Manifest**: declarative source/destination rules with copy policies
//! - **Projection**: planning and applying those rules per lifecycle phase
//! - **SyncEngine**: the `init` and `update` flows built from the pieces above
//!
//! # Architecture
//!
//! ```text
//!                 spire-cli
//!                     |
//!                spire-core
//!   snapshot/state  source  manifest  projection
//!                     |
//!                 spire-fs
//! ```

pub mod error;
pub mod manifest;
pub mod projection;
pub mod snapshot;
pub mod source;
pub mod state;
pub mod sync;

pub use error::{Error, ErrorKind, Result};
pub use manifest::{CopyPolicy, ProjectRootManifest, Rule};
pub use projection::{
    LifecyclePhase, ProjectionAction, ProjectionApplier, ProjectionOutcome, ProjectionReport,
};
pub use snapshot::PayloadSnapshot;
pub use source::{MaterializedSource, SourceConfig, SourceMetadata, SourceResolver};
pub use state::StateStore;
pub use sync::{InitReport, SyncEngine, UpdateReport};
