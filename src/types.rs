use std::str::FromStr;
use serde::Deserialize;

/// Platform family, as far as the dynamic loader is concerned.
///
/// - `Windows`: DLLs are found through `PATH`.
/// - `Darwin`: `DYLD_LIBRARY_PATH`, with `LD_LIBRARY_PATH` as a legacy fallback.
/// - `Unix`: everything else, `LD_LIBRARY_PATH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Darwin,
    Unix,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Unix
        }
    }

    /// Environment variables the dynamic loader consults on this platform.
    pub fn library_path_vars(self) -> &'static [&'static str] {
        match self {
            Platform::Windows => &["PATH"],
            Platform::Darwin => &["DYLD_LIBRARY_PATH", "LD_LIBRARY_PATH"],
            Platform::Unix => &["LD_LIBRARY_PATH"],
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::host()
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" | "win32" => Ok(Platform::Windows),
            "darwin" | "mac" | "macos" => Ok(Platform::Darwin),
            "unix" | "linux" => Ok(Platform::Unix),
            other => Err(format!(
                "invalid platform: {other} (expected \"windows\", \"darwin\" or \"unix\")"
            )),
        }
    }
}

/// Mode for storing task signatures between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureStorageMode {
    /// Store signatures in a file (`.testrun/signatures`).
    File,
    /// Store signatures in memory only (every session runs everything).
    Memory,
}

impl Default for SignatureStorageMode {
    fn default() -> Self {
        SignatureStorageMode::File
    }
}

impl FromStr for SignatureStorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(SignatureStorageMode::File),
            "memory" => Ok(SignatureStorageMode::Memory),
            other => Err(format!(
                "invalid signature_storage: {other} (expected \"file\" or \"memory\")"
            )),
        }
    }
}
