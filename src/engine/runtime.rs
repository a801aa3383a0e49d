// src/engine/runtime.rs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::engine::{SessionOutcome, TaskFailure};
use crate::errors::{Result, RunnerError};
use crate::graph::{RunnerSpec, TaskName};
use crate::runner::{RunnerState, RunnerTask};
use crate::session::BuildSession;

/// Runs every runner task of a [`BuildSession`].
///
/// At most `jobs` test binaries run at once. Each task body is synchronous
/// and occupies one blocking worker thread for its whole duration.
pub struct Engine {
    session: Arc<BuildSession>,
    jobs: usize,
    shutdown: Arc<AtomicBool>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("jobs", &self.jobs)
            .field("shutdown", &self.shutdown.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(session: Arc<BuildSession>, jobs: usize) -> Self {
        Self {
            session,
            jobs: jobs.max(1),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that, once set, stops scheduling further tasks.
    ///
    /// Tasks already running are left to finish.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub async fn run(self) -> Result<SessionOutcome> {
        info!(jobs = self.jobs, "runner session started");

        // Snapshot the specs so no graph borrow lives across an await.
        let groups: Vec<(String, Vec<RunnerSpec>)> = self
            .session
            .graph()
            .groups()
            .iter()
            .map(|g| (g.name.clone(), g.runners().cloned().collect()))
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut outcome = SessionOutcome::default();

        for (group, specs) in groups {
            if self.stopping() {
                outcome.interrupted = true;
                break;
            }
            if specs.is_empty() {
                continue;
            }

            debug!(group = %group, tasks = specs.len(), "starting task group");
            self.run_group(specs, &semaphore, &mut outcome).await?;
        }

        if self.stopping() {
            outcome.interrupted = true;
        }

        info!(
            executed = outcome.executed.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            interrupted = outcome.interrupted,
            "runner session finished"
        );
        Ok(outcome)
    }

    async fn run_group(
        &self,
        specs: Vec<RunnerSpec>,
        semaphore: &Arc<Semaphore>,
        outcome: &mut SessionOutcome,
    ) -> Result<()> {
        let mut set = JoinSet::new();
        let mut pending: Vec<TaskName> = Vec::new();

        for spec in specs {
            let permit = Arc::clone(semaphore)
                .acquire_owned()
                .await
                .map_err(|e| anyhow!("worker pool closed: {e}"))?;

            if self.stopping() {
                warn!("shutdown requested; not starting remaining tasks");
                break;
            }

            pending.push(spec.name.clone());
            let session = Arc::clone(&self.session);
            set.spawn_blocking(move || {
                let _permit = permit;
                let mut task = RunnerTask::new(spec);
                debug!(task = %task, "dispatching runner task");
                let result = task.execute(&session);
                (task.name().clone(), result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, result)) => {
                    pending.retain(|n| n != &name);
                    record(outcome, name, result);
                }
                Err(join_err) => {
                    error!(error = %join_err, "runner task panicked");
                }
            }
        }

        // Whatever never reported back panicked on its worker thread.
        for name in pending {
            outcome.failed.push(TaskFailure {
                task: name,
                error: RunnerError::Other(anyhow!("runner task panicked")),
            });
        }

        Ok(())
    }
}

fn record(outcome: &mut SessionOutcome, name: TaskName, result: Result<RunnerState>) {
    match result {
        Ok(RunnerState::Skipped) => outcome.skipped.push(name),
        Ok(_) => outcome.executed.push(name),
        Err(error) => {
            error!(task = %name, error = %error, "runner task failed");
            outcome.failed.push(TaskFailure { task: name, error });
        }
    }
}
