// src/graph/inputs.rs

//! Resolution of declared test inputs (literal paths or glob patterns).

use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::Glob;

use crate::errors::{Result, RunnerError};
use crate::fs::FileSystem;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Turn the `test_inputs` of one target into concrete file paths.
///
/// - A literal entry must name an existing file.
/// - A glob entry (`data/*.bin`, `fixtures/**/*.json`) must match at least one
///   file. Matches are sorted so staging order is stable.
pub fn resolve_test_inputs(
    fs: &dyn FileSystem,
    root: &Path,
    task: &str,
    patterns: &[String],
) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::new();

    for pattern in patterns {
        if !pattern.contains(GLOB_META) {
            let path = root.join(pattern);
            if !fs.is_file(&path) {
                return Err(RunnerError::ConfigError(format!(
                    "task '{task}': test input {:?} does not exist",
                    path
                )));
            }
            resolved.push(path);
            continue;
        }

        let mut matches = expand_glob(fs, root, pattern)
            .with_context(|| format!("expanding test input pattern '{pattern}' for task '{task}'"))?;
        if matches.is_empty() {
            return Err(RunnerError::ConfigError(format!(
                "task '{task}': test input pattern '{pattern}' matched no files"
            )));
        }
        matches.sort();
        resolved.extend(matches);
    }

    Ok(resolved)
}

/// Collect files under `root` whose root-relative path matches `pattern`.
///
/// The walk starts at the longest literal prefix of the pattern so a pattern
/// like `test/data/*.bin` does not scan the whole tree.
fn expand_glob(fs: &dyn FileSystem, root: &Path, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?
        .compile_matcher();

    let prefix: PathBuf = pattern
        .split('/')
        .take_while(|c| !c.contains(GLOB_META))
        .collect();
    let start = if prefix.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(&prefix)
    };
    if !fs.is_dir(&start) {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut stack = vec![start];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if matcher.is_match(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    Ok(files)
}
