// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;

use crate::config::model::{Manifest, OptionsSection, RawManifest};
use crate::errors::{Result, RunnerError};
use crate::runner::format::CommandTemplate;

impl TryFrom<RawManifest> for Manifest {
    type Error = RunnerError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw.options, raw.settings, raw.groups))
    }
}

/// Run all manifest checks without consuming it.
pub fn validate_manifest(cfg: &RawManifest) -> Result<()> {
    ensure_has_groups(cfg)?;
    validate_settings(cfg)?;
    validate_targets(cfg)?;
    validate_options(&cfg.options)?;
    Ok(())
}

fn ensure_has_groups(cfg: &RawManifest) -> Result<()> {
    if cfg.groups.is_empty() {
        return Err(RunnerError::ConfigError(
            "manifest must contain at least one [[group]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_settings(cfg: &RawManifest) -> Result<()> {
    if cfg.settings.jobs == Some(0) {
        return Err(RunnerError::ConfigError(
            "[settings].jobs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_targets(cfg: &RawManifest) -> Result<()> {
    let mut seen = HashSet::new();

    for target in cfg.groups.iter().flat_map(|g| g.targets.iter()) {
        if target.name.trim().is_empty() {
            return Err(RunnerError::ConfigError(
                "target name must not be empty".to_string(),
            ));
        }
        if !seen.insert(target.name.as_str()) {
            return Err(RunnerError::ConfigError(format!(
                "duplicate target name '{}'",
                target.name
            )));
        }
        if target.run && target.effective_executable().is_none() {
            return Err(RunnerError::ConfigError(format!(
                "target '{}' has run = true but neither `executable` nor `link_output`",
                target.name
            )));
        }
        if !target.run && !target.test_inputs.is_empty() {
            return Err(RunnerError::ConfigError(format!(
                "target '{}' declares test_inputs but is not runnable (run = false)",
                target.name
            )));
        }
        if let Some(mode) = target.chmod {
            if mode > 0o7777 {
                return Err(RunnerError::ConfigError(format!(
                    "target '{}' has invalid chmod {:o}",
                    target.name, mode
                )));
            }
        }
    }
    Ok(())
}

/// Checks shared by the manifest and by command-line overrides.
pub fn validate_options(options: &OptionsSection) -> Result<()> {
    if let Some(template) = options.run_cmd.as_deref() {
        CommandTemplate::parse(template)?;
    }
    if options.python_result.is_some() && !options.run_benchmark {
        warn!("python_result is set but run_benchmark is not; it will be ignored");
    }
    Ok(())
}
