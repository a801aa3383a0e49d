// src/config/mod.rs

//! Manifest loading and validation for testrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate basic invariants like unique target names (`validate.rs`).
//! - Merge `--options` overrides from the command line (`options.rs`).

pub mod loader;
pub mod model;
pub mod options;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{
    GroupConfig, Manifest, OptionsSection, RawManifest, SettingsSection, TargetConfig,
};
pub use options::apply_tool_options;
pub use validate::{validate_manifest, validate_options};
