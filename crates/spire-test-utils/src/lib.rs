//! Shared test utilities for the Spire workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`payload`]: [`MethodologyFixture`] builder for canonical payload trees
//! - [`project`]: [`TestProject`] temporary project directory with assertions
//! - [`tarball`]: [`TarballBuilder`] for `.tar.gz` archives, including hostile entries
//! - [`server`]: [`TarballServer`], a one-thread HTTP server for download tests

pub mod payload;
pub mod project;
pub mod server;
pub mod tarball;

pub use payload::MethodologyFixture;
pub use project::TestProject;
pub use server::TarballServer;
pub use tarball::TarballBuilder;
