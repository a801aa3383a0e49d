// src/engine/mod.rs

//! Session driver.
//!
//! Stands in for the host build tool's scheduler: walks the build graph's
//! task groups in order, runs the runner tasks of each group in parallel on
//! blocking worker threads, and waits for a group to finish before starting
//! the next one.
//!
//! The async shell is implemented in [`runtime`].

use crate::errors::RunnerError;
use crate::graph::TaskName;

pub mod runtime;

pub use runtime::Engine;

/// A runner task that aborted (staging or spawn failure).
#[derive(Debug)]
pub struct TaskFailure {
    pub task: TaskName,
    pub error: RunnerError,
}

/// What happened to every runner task of a session.
///
/// Pass/fail of the test binaries themselves is in the session's result log,
/// not here.
#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// Tasks that ran to completion (whatever their exit code).
    pub executed: Vec<TaskName>,
    /// Tasks skipped because their inputs were unchanged.
    pub skipped: Vec<TaskName>,
    /// Tasks that aborted.
    pub failed: Vec<TaskFailure>,
    /// Whether a shutdown request stopped scheduling before the end.
    pub interrupted: bool,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }
}
