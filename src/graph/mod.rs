// src/graph/mod.rs

//! The slice of the build graph the runner consumes.
//!
//! - [`model`] holds ordered task groups, their generators and runner specs,
//!   plus the link-output query used for library search paths.
//! - [`inputs`] resolves declared test inputs (literal or glob) to files.
//! - [`verdict`] defines the RUN/SKIP decision and the policies producing it.
//! - [`signature`] hashes task inputs and stores signatures between sessions.

/// Canonical task name type.
pub type TaskName = String;

pub mod inputs;
pub mod model;
pub mod signature;
pub mod verdict;

pub use model::{BuildGraph, RunnerSpec, TaskGenerator, TaskGroup};
pub use verdict::{FixedVerdict, RerunPolicy, SignaturePolicy, Verdict};
