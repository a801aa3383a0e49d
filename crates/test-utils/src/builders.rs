#![allow(dead_code)]

use std::path::PathBuf;

use testrun::config::{
    GroupConfig, Manifest, OptionsSection, RawManifest, SettingsSection, TargetConfig,
};

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: RawManifest {
                options: OptionsSection::default(),
                settings: SettingsSection::default(),
                groups: Vec::new(),
            },
        }
    }

    /// Start a new `[[group]]`; following `with_target` calls add to it.
    pub fn group(mut self, name: &str) -> Self {
        self.manifest.groups.push(GroupConfig {
            name: Some(name.to_string()),
            targets: Vec::new(),
        });
        self
    }

    /// Add a target to the last group, creating an unnamed group if needed.
    pub fn with_target(mut self, target: TargetConfig) -> Self {
        if self.manifest.groups.is_empty() {
            self.manifest.groups.push(GroupConfig {
                name: None,
                targets: Vec::new(),
            });
        }
        if let Some(group) = self.manifest.groups.last_mut() {
            group.targets.push(target);
        }
        self
    }

    pub fn run_always(mut self, val: bool) -> Self {
        self.manifest.options.run_always = val;
        self
    }

    pub fn run_cmd(mut self, template: &str) -> Self {
        self.manifest.options.run_cmd = Some(template.to_string());
        self
    }

    pub fn benchmark(mut self, python_result: &str) -> Self {
        self.manifest.options.run_benchmark = true;
        self.manifest.options.python_result = Some(python_result.to_string());
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.manifest.settings.jobs = Some(jobs);
        self
    }

    pub fn raw(self) -> RawManifest {
        self.manifest
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.manifest).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TargetConfig`.
pub struct TargetBuilder {
    target: TargetConfig,
}

impl TargetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            target: TargetConfig {
                name: name.to_string(),
                link_output: None,
                run: false,
                executable: None,
                test_inputs: vec![],
                chmod: None,
            },
        }
    }

    /// A shared library: link output only.
    pub fn library(name: &str, output: &str) -> Self {
        Self::new(name).link_output(output)
    }

    /// A test program: linked and run.
    pub fn test_program(name: &str, output: &str) -> Self {
        Self::new(name).link_output(output).run(true)
    }

    pub fn link_output(mut self, path: &str) -> Self {
        self.target.link_output = Some(PathBuf::from(path));
        self
    }

    pub fn run(mut self, val: bool) -> Self {
        self.target.run = val;
        self
    }

    pub fn executable(mut self, path: &str) -> Self {
        self.target.executable = Some(PathBuf::from(path));
        self
    }

    pub fn test_input(mut self, pattern: &str) -> Self {
        self.target.test_inputs.push(pattern.to_string());
        self
    }

    pub fn chmod(mut self, mode: u32) -> Self {
        self.target.chmod = Some(mode);
        self
    }

    pub fn build(self) -> TargetConfig {
        self.target
    }
}
