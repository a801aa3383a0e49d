#![allow(dead_code)]

pub use testrun_test_utils::builders;
pub use testrun_test_utils::fake_invoker::{FakeInvoker, Invocation};
pub use testrun_test_utils::init_tracing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use testrun::fs::mock::MockFileSystem;
use testrun::graph::{BuildGraph, FixedVerdict, RunnerSpec, TaskGenerator, TaskGroup, Verdict};
use testrun::session::{BuildSession, SessionOptions};
use testrun::types::Platform;

/// A graph with one group holding `libs` (link-only) followed by `runners`.
pub fn graph_with(libs: &[(&str, &str)], runners: Vec<RunnerSpec>) -> BuildGraph {
    let mut generators: Vec<TaskGenerator> = libs
        .iter()
        .map(|(name, output)| TaskGenerator {
            name: name.to_string(),
            link_output: Some(PathBuf::from(output)),
            runner: None,
        })
        .collect();

    for spec in runners {
        generators.push(TaskGenerator {
            name: spec.name.clone(),
            link_output: Some(spec.executable.clone()),
            runner: Some(spec),
        });
    }

    BuildGraph::new(vec![TaskGroup {
        name: "tests".to_string(),
        generators,
    }])
}

/// Session over a mock filesystem and a fake invoker with a fixed verdict.
pub fn fake_session(
    graph: BuildGraph,
    options: SessionOptions,
    verdict: Verdict,
    fs: &MockFileSystem,
    invoker: &FakeInvoker,
) -> BuildSession {
    BuildSession::new(graph, options)
        .with_platform(Platform::Unix)
        .with_fs(Arc::new(fs.clone()))
        .with_invoker(Arc::new(invoker.clone()))
        .with_policy(Arc::new(FixedVerdict(verdict)))
}

/// Write an executable shell script (Unix only).
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("#!/bin/sh\n{body}\n"))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}
