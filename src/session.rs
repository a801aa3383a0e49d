// src/session.rs

//! Build-session context shared by every runner task.
//!
//! A `BuildSession` owns the state that lives for exactly one build: the
//! validated tool options, the build graph, the result log and the memoized
//! library path table. Runner tasks receive it by reference; nothing here is
//! global.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::model::OptionsSection;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::{BuildGraph, FixedVerdict, RerunPolicy, Verdict};
use crate::runner::format::{format_argv, format_command, CommandTemplate};
use crate::runner::invoke::{ProcessInvoker, RealInvoker};
use crate::runner::libpath::{compose_library_paths, LibraryPathTable};
use crate::runner::results::ResultLog;
use crate::types::Platform;

/// Tool options, validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub run_always: bool,
    pub run_cmd: Option<CommandTemplate>,
    pub run_benchmark: bool,
    pub python_result: Option<PathBuf>,
}

impl TryFrom<&OptionsSection> for SessionOptions {
    type Error = crate::errors::RunnerError;

    fn try_from(section: &OptionsSection) -> std::result::Result<Self, Self::Error> {
        let run_cmd = section
            .run_cmd
            .as_deref()
            .map(CommandTemplate::parse)
            .transpose()?;

        Ok(Self {
            run_always: section.run_always,
            run_cmd,
            run_benchmark: section.run_benchmark,
            python_result: section.python_result.as_ref().map(PathBuf::from),
        })
    }
}

impl SessionOptions {
    /// Command line for `executable` after applying `run_cmd`.
    pub fn format_command(&self, executable: &str) -> String {
        format_command(self.run_cmd.as_ref(), executable)
    }

    /// Full argument vector: the formatted command plus `--pyfile=<path>` in
    /// benchmark mode when a result file is configured.
    pub fn invocation(&self, executable: &str) -> Vec<String> {
        let mut argv = format_argv(self.run_cmd.as_ref(), executable);
        if let Some(pyfile) = self.benchmark_result_file() {
            argv.push(format!("--pyfile={}", pyfile.display()));
        }
        argv
    }

    fn benchmark_result_file(&self) -> Option<&PathBuf> {
        if self.run_benchmark {
            self.python_result.as_ref()
        } else {
            None
        }
    }
}

pub struct BuildSession {
    options: SessionOptions,
    graph: Arc<BuildGraph>,
    platform: Platform,
    fs: Arc<dyn FileSystem>,
    invoker: Arc<dyn ProcessInvoker>,
    policy: Arc<dyn RerunPolicy>,
    results: ResultLog,
    library_paths: OnceLock<LibraryPathTable>,
}

impl fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildSession")
            .field("options", &self.options)
            .field("platform", &self.platform)
            .field("results", &self.results.len())
            .finish_non_exhaustive()
    }
}

impl BuildSession {
    /// New session with production collaborators: the host platform, the real
    /// filesystem, real processes, and a policy that runs every task.
    pub fn new(graph: BuildGraph, options: SessionOptions) -> Self {
        Self {
            options,
            graph: Arc::new(graph),
            platform: Platform::host(),
            fs: Arc::new(RealFileSystem),
            invoker: Arc::new(RealInvoker),
            policy: Arc::new(FixedVerdict(Verdict::Run)),
            results: ResultLog::new(),
            library_paths: OnceLock::new(),
        }
    }

    /// Build a session straight from an `[options]` section.
    pub fn from_section(graph: BuildGraph, section: &OptionsSection) -> Result<Self> {
        Ok(Self::new(graph, SessionOptions::try_from(section)?))
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn ProcessInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn RerunPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn invoker(&self) -> &dyn ProcessInvoker {
        self.invoker.as_ref()
    }

    pub fn policy(&self) -> &dyn RerunPolicy {
        self.policy.as_ref()
    }

    /// The session's result log.
    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    /// Library search paths for this session, computed on first use.
    ///
    /// Concurrent first callers block until the one computing it finishes;
    /// every caller gets the same table.
    pub fn library_paths(&self) -> &LibraryPathTable {
        self.library_paths.get_or_init(|| {
            debug!("library path table not cached yet; scanning build graph");
            compose_library_paths(&self.graph, self.platform)
        })
    }
}
