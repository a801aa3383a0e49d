// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{Platform, SignatureStorageMode};

/// Manifest as read from a TOML file, before validation.
///
/// ```toml
/// [options]
/// run_always = false
/// run_cmd = "valgrind --error-exitcode=1 %s"
///
/// [settings]
/// signature_storage = "file"
/// jobs = 4
///
/// [[group]]
/// name = "libs"
///
/// [[group.target]]
/// name = "foo"
/// link_output = "build/libfoo.so"
///
/// [[group]]
/// name = "tests"
///
/// [[group.target]]
/// name = "test_foo"
/// link_output = "build/test_foo"
/// run = true
/// test_inputs = ["test/data/*.bin"]
/// chmod = 0o644
/// ```
///
/// All sections are optional at the TOML level; validation insists on at
/// least one group.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub options: OptionsSection,

    #[serde(default)]
    pub settings: SettingsSection,

    /// Task groups, in build order.
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupConfig>,
}

/// A validated manifest.
///
/// Only constructible through `TryFrom<RawManifest>` (see `validate.rs`), so
/// holding one means target names are unique, runnable targets have an
/// executable and the run-command template parses.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub(crate) options: OptionsSection,
    pub(crate) settings: SettingsSection,
    pub(crate) groups: Vec<GroupConfig>,
}

impl Manifest {
    pub(crate) fn new_unchecked(
        options: OptionsSection,
        settings: SettingsSection,
        groups: Vec<GroupConfig>,
    ) -> Self {
        Self {
            options,
            settings,
            groups,
        }
    }

    pub fn options(&self) -> &OptionsSection {
        &self.options
    }

    pub fn settings(&self) -> &SettingsSection {
        &self.settings
    }

    pub fn groups(&self) -> &[GroupConfig] {
        &self.groups
    }

    /// Iterate every target of every group, in build order.
    pub fn targets(&self) -> impl Iterator<Item = &TargetConfig> {
        self.groups.iter().flat_map(|g| g.targets.iter())
    }
}

/// `[options]` section: the tool options a build session is configured with.
///
/// Each field can be overridden from the command line.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OptionsSection {
    /// Run test binaries even when their inputs are unchanged.
    #[serde(default)]
    pub run_always: bool,

    /// Wrapper template, e.g. `"valgrind %s"`. Must contain exactly one `%s`.
    #[serde(default)]
    pub run_cmd: Option<String>,

    /// Benchmark mode.
    #[serde(default)]
    pub run_benchmark: bool,

    /// Benchmark result file, passed as `--pyfile=<path>` in benchmark mode.
    #[serde(default)]
    pub python_result: Option<String>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsSection {
    /// Where task signatures are kept between sessions.
    #[serde(default)]
    pub signature_storage: SignatureStorageMode,

    /// Maximum number of test binaries running at once.
    ///
    /// If `None`, the available parallelism of the machine is used.
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Override the platform used for library path composition.
    #[serde(default)]
    pub platform: Option<Platform>,
}

/// `[[group]]` entry: an ordered batch of targets.
///
/// Groups are processed one after the other; targets inside a group run in
/// parallel.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,
}

/// `[[group.target]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,

    /// Output of this target's link step (shared library or program).
    ///
    /// Its directory is added to the dynamic-loader search path of every
    /// test binary.
    #[serde(default)]
    pub link_output: Option<PathBuf>,

    /// Whether this target is a test binary to execute.
    #[serde(default)]
    pub run: bool,

    /// Executable to run. Defaults to `link_output`.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Files (or glob patterns) copied next to the executable before it runs.
    #[serde(default)]
    pub test_inputs: Vec<String>,

    /// Permission bits applied to each staged test input.
    #[serde(default)]
    pub chmod: Option<u32>,
}

impl TargetConfig {
    /// The executable of a runnable target: `executable`, else `link_output`.
    pub fn effective_executable(&self) -> Option<&PathBuf> {
        self.executable.as_ref().or(self.link_output.as_ref())
    }
}
