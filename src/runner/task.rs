// src/runner/task.rs

//! The runner task: executes one test binary and records its outcome.

use std::fmt;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::graph::{RunnerSpec, TaskName, Verdict};
use crate::runner::results::{AggregateResult, ExecutionResult};
use crate::runner::stage::stage_test_inputs;
use crate::session::BuildSession;

/// Lifecycle of a runner task.
///
/// `Pending → Skipped` or `Pending → Staging → Executing → Aggregating → Done`.
/// `Skipped` and `Done` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Pending,
    Skipped,
    Staging,
    Executing,
    Aggregating,
    Done,
}

impl RunnerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunnerState::Skipped | RunnerState::Done)
    }
}

#[derive(Debug, Clone)]
pub struct RunnerTask {
    spec: RunnerSpec,
    state: RunnerState,
}

impl RunnerTask {
    pub fn new(spec: RunnerSpec) -> Self {
        Self {
            spec,
            state: RunnerState::Pending,
        }
    }

    pub fn name(&self) -> &TaskName {
        &self.spec.name
    }

    pub fn spec(&self) -> &RunnerSpec {
        &self.spec
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// The scheduler's verdict, overridden to `Run` when `run_always` is set.
    pub fn runnable_status(&self, session: &BuildSession) -> Result<Verdict> {
        let verdict = session.policy().verdict(&self.spec)?;
        if verdict == Verdict::Skip && session.options().run_always {
            debug!(task = %self.spec.name, "run_always set; overriding skip verdict");
            return Ok(Verdict::Run);
        }
        Ok(verdict)
    }

    /// Drive the task from `Pending` to a terminal state.
    ///
    /// A nonzero exit of the test binary is recorded in the result log and is
    /// *not* an error. Errors are staging or spawn failures; the task then
    /// stays in the state where it failed and nothing is logged.
    pub fn execute(&mut self, session: &BuildSession) -> Result<RunnerState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        if self.runnable_status(session)? == Verdict::Skip {
            debug!(task = %self.spec.name, "inputs unchanged; skipping");
            self.state = RunnerState::Skipped;
            return Ok(self.state);
        }

        self.state = RunnerState::Staging;
        stage_test_inputs(
            session.fs(),
            &self.spec.executable,
            &self.spec.test_inputs,
            self.spec.chmod,
        )?;

        self.state = RunnerState::Executing;
        let result = self.invoke(session)?;

        self.state = RunnerState::Aggregating;
        let passed = self.save_result(session, &[result]);

        self.state = RunnerState::Done;
        // A failing binary must run again next session.
        if passed {
            if let Err(e) = session.policy().record(&self.spec) {
                warn!(task = %self.spec.name, error = %e, "failed to record task signature");
            }
        }
        Ok(self.state)
    }

    fn invoke(&self, session: &BuildSession) -> Result<ExecutionResult> {
        let executable = self.spec.executable.to_string_lossy();
        let argv = session.options().invocation(&executable);
        let env = session.library_paths().to_env();

        info!(task = %self.spec.name, cmd = %argv.join(" "), "running test binary");
        session.invoker().invoke(&argv, &env)
    }

    /// Merge `results` and append them to the session's result log.
    ///
    /// Returns whether the merged result passed.
    pub fn save_result(&self, session: &BuildSession, results: &[ExecutionResult]) -> bool {
        let name = session
            .options()
            .format_command(&self.spec.executable.to_string_lossy());
        let merged = AggregateResult::merge(name, results);
        let passed = merged.passed();
        session.results().submit(merged);
        passed
    }
}

/// `runner: <executable> -> <staged files> {test input: <inputs>}`
impl fmt::Display for RunnerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outputs = self.spec.outputs();
        write!(f, "runner: {}", self.spec.executable.display())?;
        if !outputs.is_empty() {
            let tgt: Vec<String> = outputs.iter().map(|p| p.display().to_string()).collect();
            write!(f, " -> {}", tgt.join(" "))?;
        }
        if !self.spec.test_inputs.is_empty() {
            let tst: Vec<String> = self
                .spec
                .test_inputs
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            write!(f, " {{test input: {}}}", tst.join(" "))?;
        }
        Ok(())
    }
}
