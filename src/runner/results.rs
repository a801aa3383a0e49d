// src/runner/results.rs

//! Execution records and the session-wide result log.

use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

/// Raw outcome of a single process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The exact argument vector that was executed.
    pub command: Vec<String>,
    /// OS exit status; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// One runner task's combined outcome, as stored in the [`ResultLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateResult {
    /// Formatted command line of the task's executable.
    pub name: String,
    /// `0` if every merged invocation exited with 0, `-1` otherwise.
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl AggregateResult {
    /// Merge one or more invocations into a single record.
    ///
    /// Each invocation contributes a `Running <cmd>` header followed by its
    /// captured output. Output is decoded as UTF-8, lossily.
    pub fn merge(name: impl Into<String>, results: &[ExecutionResult]) -> Self {
        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut return_code = 0;

        for result in results {
            let cmd = result.command_line();
            let _ = writeln!(stdout, "Running {cmd}\n{}", String::from_utf8_lossy(&result.stdout));
            let _ = writeln!(stderr, "Running {cmd}\n{}", String::from_utf8_lossy(&result.stderr));
            if result.exit_code != 0 {
                return_code = -1;
            }
        }

        Self {
            name: name.into(),
            return_code,
            stdout,
            stderr,
        }
    }

    pub fn passed(&self) -> bool {
        self.return_code == 0
    }

    /// The `(name, return_code, stdout, stderr)` view handed to reporters.
    pub fn as_tuple(&self) -> (&str, i32, &str, &str) {
        (&self.name, self.return_code, &self.stdout, &self.stderr)
    }
}

/// Append-only log of every runner task's result in one build session.
///
/// The lock is held only for the duration of a single push; it is never held
/// while a process runs.
#[derive(Debug, Default)]
pub struct ResultLog {
    entries: Mutex<Vec<AggregateResult>>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result. Safe to call from any number of threads.
    pub fn submit(&self, result: AggregateResult) {
        debug!(name = %result.name, return_code = result.return_code, "recording runner result");
        self.lock().push(result);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current entries, in submission order.
    pub fn snapshot(&self) -> Vec<AggregateResult> {
        self.lock().clone()
    }

    /// Take all entries out of the log, for reporting after the build.
    pub fn drain(&self) -> Vec<AggregateResult> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AggregateResult>> {
        // A panic while pushing cannot leave the Vec half-written.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
