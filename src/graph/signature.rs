use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::graph::model::RunnerSpec;
use crate::graph::TaskName;

/// Relative path (from the manifest root) to the signatures file.
pub const SIGNATURE_FILE_PATH: &str = ".testrun/signatures";

fn signature_file_path(root: &Path) -> PathBuf {
    root.join(SIGNATURE_FILE_PATH)
}

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Signature of a runner task: its executable and every test input, by path
/// and content.
///
/// Returns `None` if any of those files is missing; such a task always runs.
pub fn compute_task_signature(fs: &dyn FileSystem, spec: &RunnerSpec) -> Result<Option<String>> {
    let mut hasher = Hasher::new();

    for path in std::iter::once(&spec.executable).chain(spec.test_inputs.iter()) {
        if !fs.is_file(path) {
            debug!(task = %spec.name, ?path, "signature input missing");
            return Ok(None);
        }
        let file_hash = compute_file_hash(fs, path)?;
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(file_hash.as_bytes());
    }

    Ok(Some(hasher.finalize().to_hex().to_string()))
}

/// Abstract storage for task signatures.
pub trait SignatureStore: Send + Sync {
    fn load(&self, task: &str) -> Result<Option<String>>;
    fn save(&mut self, task: &str, signature: &str) -> Result<()>;
    /// Remove signatures for tasks that are not in the `active_tasks` list.
    fn prune(&mut self, active_tasks: &[&str]) -> Result<()>;
}

/// Stores signatures in a file (`.testrun/signatures`).
pub struct FileSignatureStore {
    root: PathBuf,
}

impl FileSignatureStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl SignatureStore for FileSignatureStore {
    fn load(&self, task: &str) -> Result<Option<String>> {
        let map = load_all_signatures(&self.root)?;
        Ok(map.get(task).cloned())
    }

    fn save(&mut self, task: &str, signature: &str) -> Result<()> {
        let mut map = load_all_signatures(&self.root)?;
        map.insert(task.to_string(), signature.to_string());
        save_all_signatures(&self.root, &map)?;
        debug!(task = %task, signature = %signature, "stored task signature (file)");
        Ok(())
    }

    fn prune(&mut self, active_tasks: &[&str]) -> Result<()> {
        let mut map = load_all_signatures(&self.root)?;
        let initial_len = map.len();
        map.retain(|k, _| active_tasks.contains(&k.as_str()));

        if map.len() < initial_len {
            save_all_signatures(&self.root, &map)?;
            info!(
                removed = initial_len - map.len(),
                "pruned stale task signatures (file)"
            );
        }
        Ok(())
    }
}

/// Stores signatures in memory only.
#[derive(Default)]
pub struct MemorySignatureStore {
    map: HashMap<String, String>,
}

impl MemorySignatureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignatureStore for MemorySignatureStore {
    fn load(&self, task: &str) -> Result<Option<String>> {
        Ok(self.map.get(task).cloned())
    }

    fn save(&mut self, task: &str, signature: &str) -> Result<()> {
        self.map.insert(task.to_string(), signature.to_string());
        debug!(task = %task, signature = %signature, "stored task signature (memory)");
        Ok(())
    }

    fn prune(&mut self, active_tasks: &[&str]) -> Result<()> {
        let initial_len = self.map.len();
        self.map.retain(|k, _| active_tasks.contains(&k.as_str()));
        if self.map.len() < initial_len {
            info!(
                removed = initial_len - self.map.len(),
                "pruned stale task signatures (memory)"
            );
        }
        Ok(())
    }
}

/// Load all stored signatures from `<root>/.testrun/signatures`.
fn load_all_signatures(root: &Path) -> Result<HashMap<TaskName, String>> {
    let path = signature_file_path(root);

    if !path.exists() {
        return Ok(HashMap::new());
    }

    let file = File::open(&path)
        .with_context(|| format!("opening signature file at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();

    for line_res in reader.lines() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Signatures never contain whitespace; task names may.
        if let Some((name, sig)) = trimmed.rsplit_once(char::is_whitespace) {
            map.insert(name.trim().to_string(), sig.to_string());
        }
    }

    Ok(map)
}

/// Persist all signatures to `<root>/.testrun/signatures`.
fn save_all_signatures(root: &Path, map: &HashMap<TaskName, String>) -> Result<()> {
    let path = signature_file_path(root);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating signature directory at {:?}", parent))?;
    }

    let file = File::create(&path)
        .with_context(|| format!("creating signature file at {:?}", path))?;
    let mut writer = BufWriter::new(file);

    let mut entries: Vec<_> = map.iter().collect();
    entries.sort();
    for (name, sig) in entries {
        writeln!(writer, "{} {}", name, sig)?;
    }

    writer.flush()?;
    Ok(())
}
