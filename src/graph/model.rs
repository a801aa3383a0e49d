// src/graph/model.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{Manifest, TargetConfig};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::graph::inputs::resolve_test_inputs;
use crate::graph::TaskName;
use crate::runner::stage::staged_path;

/// Everything a runner task needs to know about the binary it executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSpec {
    pub name: TaskName,
    /// Primary input: the executable under test.
    pub executable: PathBuf,
    /// Auxiliary test inputs, already resolved to concrete files.
    pub test_inputs: Vec<PathBuf>,
    /// Permission bits for staged test inputs.
    pub chmod: Option<u32>,
}

impl RunnerSpec {
    pub fn new(name: impl Into<TaskName>, executable: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            test_inputs: Vec::new(),
            chmod: None,
        }
    }

    pub fn with_test_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.test_inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn with_chmod(mut self, mode: u32) -> Self {
        self.chmod = Some(mode);
        self
    }

    /// Files this task writes: the staged copies of its test inputs.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.test_inputs
            .iter()
            .filter_map(|input| staged_path(&self.executable, input))
            .collect()
    }
}

/// A node of the build graph: one declared target.
///
/// A generator may link something (its output directory then feeds the
/// library search path), run something, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGenerator {
    pub name: TaskName,
    pub link_output: Option<PathBuf>,
    pub runner: Option<RunnerSpec>,
}

/// An ordered batch of generators. Groups are built one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGroup {
    pub name: String,
    pub generators: Vec<TaskGenerator>,
}

impl TaskGroup {
    pub fn runners(&self) -> impl Iterator<Item = &RunnerSpec> {
        self.generators.iter().filter_map(|g| g.runner.as_ref())
    }
}

/// The build graph as far as the runner is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildGraph {
    groups: Vec<TaskGroup>,
}

impl BuildGraph {
    pub fn new(groups: Vec<TaskGroup>) -> Self {
        Self { groups }
    }

    /// Build the graph from a validated manifest.
    ///
    /// Relative paths are resolved against `root`; test-input patterns are
    /// expanded against the filesystem.
    pub fn from_manifest(manifest: &Manifest, root: &Path, fs: &dyn FileSystem) -> Result<Self> {
        let mut groups = Vec::with_capacity(manifest.groups().len());

        for (idx, group) in manifest.groups().iter().enumerate() {
            let name = group
                .name
                .clone()
                .unwrap_or_else(|| format!("group{idx}"));

            let generators = group
                .targets
                .iter()
                .map(|t| generator_from_target(t, root, fs))
                .collect::<Result<Vec<_>>>()?;

            debug!(group = %name, targets = generators.len(), "loaded task group");
            groups.push(TaskGroup { name, generators });
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    /// All runner specs, in build order.
    pub fn runners(&self) -> impl Iterator<Item = &RunnerSpec> {
        self.groups.iter().flat_map(|g| g.runners())
    }

    /// Directory of every link output in the graph, first-seen order,
    /// without duplicates.
    pub fn link_output_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for generator in self.groups.iter().flat_map(|g| g.generators.iter()) {
            let Some(output) = generator.link_output.as_ref() else {
                continue;
            };
            let dir = match output.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }
}

fn generator_from_target(
    target: &TargetConfig,
    root: &Path,
    fs: &dyn FileSystem,
) -> Result<TaskGenerator> {
    let link_output = target.link_output.as_ref().map(|p| root.join(p));

    let runner = if target.run {
        match target.effective_executable() {
            Some(exe) => Some(RunnerSpec {
                name: target.name.clone(),
                executable: root.join(exe),
                test_inputs: resolve_test_inputs(fs, root, &target.name, &target.test_inputs)?,
                chmod: target.chmod,
            }),
            // Validation rejects runnable targets without an executable.
            None => None,
        }
    } else {
        None
    };

    Ok(TaskGenerator {
        name: target.name.clone(),
        link_output,
        runner,
    })
}
