// src/runner/libpath.rs

//! Dynamic-library search paths for test binaries.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::graph::BuildGraph;
use crate::runner::invoke::EnvOverrides;
use crate::types::Platform;

/// Loader variable name → directories to search, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPathTable {
    vars: BTreeMap<String, Vec<PathBuf>>,
}

impl LibraryPathTable {
    pub fn get(&self, var: &str) -> Option<&[PathBuf]> {
        self.vars.get(var).map(|v| v.as_slice())
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Value for `var`: the composed directories followed by every entry of
    /// `existing`.
    ///
    /// Returns `None` if the table has no such variable or a composed
    /// directory contains the path separator.
    pub fn env_value(&self, var: &str, existing: Option<&OsStr>) -> Option<OsString> {
        let dirs = self.vars.get(var)?;
        let inherited = existing
            .filter(|e| !e.is_empty())
            .map(|e| std::env::split_paths(e).collect::<Vec<_>>())
            .unwrap_or_default();
        match std::env::join_paths(dirs.iter().chain(inherited.iter())) {
            Ok(joined) => Some(joined),
            Err(e) => {
                warn!(var, error = %e, "cannot build library search path");
                None
            }
        }
    }

    /// Environment overrides for a child process, falling back to the
    /// current process environment for pre-existing values.
    pub fn to_env(&self) -> EnvOverrides {
        self.to_env_with(|var| std::env::var_os(var))
    }

    /// Same as [`to_env`](Self::to_env) with an explicit lookup for existing
    /// values.
    pub fn to_env_with<F>(&self, lookup: F) -> EnvOverrides
    where
        F: Fn(&str) -> Option<OsString>,
    {
        self.vars
            .keys()
            .filter_map(|var| {
                let existing = lookup(var);
                self.env_value(var, existing.as_deref())
                    .map(|value| (var.clone(), value))
            })
            .collect()
    }
}

/// Build the table from every link output directory in `graph`.
///
/// Every platform gets its variables, even if the graph has no link outputs,
/// so the pre-existing value is still passed through.
pub fn compose_library_paths(graph: &BuildGraph, platform: Platform) -> LibraryPathTable {
    let dirs = graph.link_output_dirs();
    debug!(?platform, dirs = dirs.len(), "composing library search paths");

    let vars = platform
        .library_path_vars()
        .iter()
        .map(|var| (var.to_string(), dirs.clone()))
        .collect();

    LibraryPathTable { vars }
}
