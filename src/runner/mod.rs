// src/runner/mod.rs

//! Test binary execution.
//!
//! - [`invoke`] spawns one process and captures its output.
//! - [`format`] applies the optional `run_cmd` wrapper template.
//! - [`stage`] copies test inputs next to the executable.
//! - [`libpath`] composes dynamic-loader search paths.
//! - [`results`] holds execution records and the session-wide result log.
//! - [`task`] is the runner task state machine tying these together.

pub mod format;
pub mod invoke;
pub mod libpath;
pub mod results;
pub mod stage;
pub mod task;

pub use format::CommandTemplate;
pub use invoke::{EnvOverrides, ProcessInvoker, RealInvoker};
pub use libpath::LibraryPathTable;
pub use results::{AggregateResult, ExecutionResult, ResultLog};
pub use task::{RunnerState, RunnerTask};
