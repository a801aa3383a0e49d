// src/runner/stage.rs

//! Copy test inputs next to the executable under test.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::debug;

use crate::errors::{Result, RunnerError};
use crate::fs::FileSystem;

/// Where `input` lands when staged for `executable`: the executable's
/// directory, same base name as the input.
pub fn staged_path(executable: &Path, input: &Path) -> Option<PathBuf> {
    let dir = match executable.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    input.file_name().map(|name| dir.join(name))
}

/// Copy each of `inputs` byte-for-byte next to `executable`.
///
/// If `mode` is set, it is applied to every staged file after writing.
/// Returns the destination paths in input order. The first failure aborts
/// staging.
pub fn stage_test_inputs(
    fs: &dyn FileSystem,
    executable: &Path,
    inputs: &[PathBuf],
    mode: Option<u32>,
) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::with_capacity(inputs.len());

    for src in inputs {
        let dst = staged_path(executable, src).ok_or_else(|| RunnerError::Stage {
            src: src.clone(),
            dst: PathBuf::new(),
            source: anyhow!("test input has no file name"),
        })?;

        debug!(src = ?src, dst = ?dst, "staging test input");

        let stage_err = |source| RunnerError::Stage {
            src: src.clone(),
            dst: dst.clone(),
            source,
        };

        let bytes = fs.read(src).map_err(stage_err)?;
        fs.write(&dst, &bytes).map_err(stage_err)?;
        if let Some(mode) = mode {
            fs.set_mode(&dst, mode).map_err(stage_err)?;
        }

        staged.push(dst);
    }

    Ok(staged)
}
