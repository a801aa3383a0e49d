// src/runner/invoke.rs

//! Process invocation.
//!
//! Runner tasks talk to a [`ProcessInvoker`] instead of `std::process`
//! directly, so tests can record what would have been executed without
//! spawning anything.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::errors::{Result, RunnerError};
use crate::runner::results::ExecutionResult;

/// Environment overrides applied on top of the inherited environment.
pub type EnvOverrides = Vec<(String, OsString)>;

/// Trait abstracting how a command is executed.
pub trait ProcessInvoker: Send + Sync {
    /// Run `argv` to completion and capture its output.
    ///
    /// Blocks the calling thread until the child exits.
    fn invoke(&self, argv: &[String], env: &EnvOverrides) -> Result<ExecutionResult>;
}

/// Invoker that spawns real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealInvoker;

impl ProcessInvoker for RealInvoker {
    fn invoke(&self, argv: &[String], env: &EnvOverrides) -> Result<ExecutionResult> {
        run_cmd(argv, env)
    }
}

/// Spawn `argv[0]` with `argv[1..]`, wait for it, and capture both streams.
///
/// Spawn failures are returned as [`RunnerError::Spawn`]; a nonzero exit is
/// not an error and is reported through `exit_code`.
pub fn run_cmd(argv: &[String], env: &EnvOverrides) -> Result<ExecutionResult> {
    let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;

    debug!(?argv, "running command");

    let output = Command::new(program)
        .args(args)
        .envs(env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| RunnerError::Spawn {
            program: program.clone(),
            source,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);

    info!(
        cmd = %argv.join(" "),
        exit_code,
        success = output.status.success(),
        "process exited"
    );

    Ok(ExecutionResult {
        command: argv.to_vec(),
        exit_code,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
