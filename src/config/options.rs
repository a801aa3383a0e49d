// src/config/options.rs

//! Command-line tool options (`--options run_always,run_cmd=valgrind %s`).
//!
//! A comma-separated list of `key` or `key=value` items. A bare key switches
//! a flag on; keys taking a value require one.

use crate::config::model::OptionsSection;
use crate::errors::{Result, RunnerError};

/// Apply an `--options` string on top of `base`.
pub fn apply_tool_options(base: &mut OptionsSection, list: &str) -> Result<()> {
    for item in list.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }

        let (key, value) = match item.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (item, None),
        };

        match key {
            "run_always" => base.run_always = parse_flag(key, value)?,
            "run_benchmark" => base.run_benchmark = parse_flag(key, value)?,
            "run_cmd" => base.run_cmd = Some(require_value(key, value)?),
            "python_result" => base.python_result = Some(require_value(key, value)?),
            other => {
                return Err(RunnerError::ConfigError(format!(
                    "unknown tool option '{other}' (expected run_always, run_cmd, run_benchmark or python_result)"
                )));
            }
        }
    }
    Ok(())
}

fn parse_flag(key: &str, value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.to_lowercase()) {
        None => Ok(true),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(RunnerError::ConfigError(format!(
                "tool option '{key}' expects a boolean, got '{v}'"
            ))),
        },
    }
}

fn require_value(key: &str, value: Option<&str>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(RunnerError::ConfigError(format!(
            "tool option '{key}' requires a value ({key}=...)"
        ))),
    }
}
