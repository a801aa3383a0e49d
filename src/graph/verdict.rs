// src/graph/verdict.rs

//! Incremental "should this task run" decisions.
//!
//! The runner only consumes a [`Verdict`]; how it is reached is up to the
//! [`RerunPolicy`] the session is built with.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::graph::model::RunnerSpec;
use crate::graph::signature::{compute_task_signature, SignatureStore};

/// The scheduler's decision for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Run,
    Skip,
}

/// Source of incremental-rebuild verdicts.
pub trait RerunPolicy: Send + Sync {
    fn verdict(&self, spec: &RunnerSpec) -> Result<Verdict>;

    /// Called once a task has executed, so later sessions can skip it.
    fn record(&self, spec: &RunnerSpec) -> Result<()>;
}

/// Always returns the same verdict; records nothing.
#[derive(Debug, Clone, Copy)]
pub struct FixedVerdict(pub Verdict);

impl RerunPolicy for FixedVerdict {
    fn verdict(&self, _spec: &RunnerSpec) -> Result<Verdict> {
        Ok(self.0)
    }

    fn record(&self, _spec: &RunnerSpec) -> Result<()> {
        Ok(())
    }
}

/// Content-signature policy: a task is skipped when its executable and test
/// inputs hash to the signature recorded after its last execution.
pub struct SignaturePolicy {
    fs: Arc<dyn FileSystem>,
    store: Mutex<Box<dyn SignatureStore>>,
}

impl fmt::Debug for SignaturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignaturePolicy").finish_non_exhaustive()
    }
}

impl SignaturePolicy {
    pub fn new(fs: Arc<dyn FileSystem>, store: Box<dyn SignatureStore>) -> Self {
        Self {
            fs,
            store: Mutex::new(store),
        }
    }

    /// Drop signatures of tasks no longer in the graph.
    pub fn prune(&self, active_tasks: &[&str]) -> Result<()> {
        let mut store = self.store.lock().unwrap_or_else(|p| p.into_inner());
        store.prune(active_tasks)?;
        Ok(())
    }
}

impl RerunPolicy for SignaturePolicy {
    fn verdict(&self, spec: &RunnerSpec) -> Result<Verdict> {
        let Some(current) = compute_task_signature(self.fs.as_ref(), spec)? else {
            return Ok(Verdict::Run);
        };

        let stored = {
            let store = self.store.lock().unwrap_or_else(|p| p.into_inner());
            store.load(&spec.name)?
        };

        let verdict = match stored {
            Some(prev) if prev == current => Verdict::Skip,
            _ => Verdict::Run,
        };
        debug!(task = %spec.name, ?verdict, "signature verdict");
        Ok(verdict)
    }

    fn record(&self, spec: &RunnerSpec) -> Result<()> {
        let Some(current) = compute_task_signature(self.fs.as_ref(), spec)? else {
            return Ok(());
        };
        let mut store = self.store.lock().unwrap_or_else(|p| p.into_inner());
        store.save(&spec.name, &current)?;
        Ok(())
    }
}
