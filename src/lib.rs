// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod report;
pub mod runner;
pub mod session;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{apply_tool_options, load_and_validate, validate_options, OptionsSection};
use crate::engine::Engine;
use crate::fs::{FileSystem, RealFileSystem};
use crate::graph::signature::{FileSignatureStore, MemorySignatureStore, SignatureStore};
use crate::graph::{BuildGraph, SignaturePolicy};
use crate::report::write_report;
use crate::runner::RunnerTask;
use crate::session::{BuildSession, SessionOptions};
use crate::types::{Platform, SignatureStorageMode};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading and option overrides
/// - the build graph and signature policy
/// - the build session and the engine
/// - Ctrl-C handling
/// - the final report
///
/// Returns `Ok(true)` when every test binary passed and no task aborted.
pub async fn run(args: CliArgs) -> Result<bool> {
    let manifest = load_and_validate(&args.manifest)?;

    let mut options = manifest.options().clone();
    apply_cli_overrides(&mut options, &args)?;
    validate_options(&options)?;
    let session_options = SessionOptions::try_from(&options)?;

    let root = manifest_root_dir(&args.manifest)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let graph = BuildGraph::from_manifest(&manifest, &root, fs.as_ref())?;

    let settings = manifest.settings();
    let platform = settings.platform.unwrap_or_else(Platform::host);
    let jobs = args
        .jobs
        .or(settings.jobs)
        .unwrap_or_else(default_jobs);

    let store: Box<dyn SignatureStore> = match settings.signature_storage {
        SignatureStorageMode::File => Box::new(FileSignatureStore::new(root.clone())),
        SignatureStorageMode::Memory => Box::new(MemorySignatureStore::new()),
    };
    let policy = SignaturePolicy::new(Arc::clone(&fs), store);
    let active: Vec<&str> = graph.runners().map(|r| r.name.as_str()).collect();
    policy.prune(&active)?;

    let session = BuildSession::new(graph, session_options)
        .with_platform(platform)
        .with_fs(fs)
        .with_policy(Arc::new(policy));

    if args.dry_run {
        print_dry_run(&session, jobs);
        return Ok(true);
    }

    let session = Arc::new(session);
    let engine = Engine::new(Arc::clone(&session), jobs);

    // Ctrl-C → stop scheduling new tasks.
    {
        let shutdown = engine.shutdown_handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; finishing running tasks");
            shutdown.store(true, Ordering::SeqCst);
        });
    }

    let outcome = engine.run().await?;

    let results = session.results().drain();
    let stdout = std::io::stdout();
    let summary = write_report(&mut stdout.lock(), &results, &outcome)?;

    Ok(summary.all_passed() && outcome.is_success())
}

/// Layer `--options` and the dedicated flags over the manifest's `[options]`.
fn apply_cli_overrides(options: &mut OptionsSection, args: &CliArgs) -> Result<()> {
    if let Some(list) = args.options.as_deref() {
        apply_tool_options(options, list)?;
    }
    if args.run_always {
        options.run_always = true;
    }
    if let Some(cmd) = &args.run_cmd {
        options.run_cmd = Some(cmd.clone());
    }
    if args.run_benchmark {
        options.run_benchmark = true;
    }
    if let Some(path) = &args.python_result {
        options.python_result = Some(path.clone());
    }
    Ok(())
}

/// Absolute directory relative manifest paths are resolved against.
///
/// - "ci/Testrun.toml" resolves to `<cwd>/ci`.
/// - A bare "Testrun.toml" resolves to the current working directory.
///
/// Library search paths built from this root must stay valid after a test
/// binary changes directory, so the result is always absolute.
pub fn manifest_root_dir(manifest_path: &Path) -> Result<PathBuf> {
    let parent = match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let root = std::path::absolute(parent)
        .with_context(|| format!("resolving manifest directory {:?}", parent))?;
    Ok(root)
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Simple dry-run output: print options, search paths and runner tasks.
fn print_dry_run(session: &BuildSession, jobs: usize) {
    let opts = session.options();
    println!("testrun dry-run");
    println!("  run_always = {}", opts.run_always);
    if let Some(t) = &opts.run_cmd {
        println!("  run_cmd = {t}");
    }
    if opts.run_benchmark {
        println!("  run_benchmark = true");
    }
    if let Some(p) = &opts.python_result {
        println!("  python_result = {}", p.display());
    }
    println!("  platform = {:?}", session.platform());
    println!("  jobs = {jobs}");
    println!();

    for (var, dirs) in session.library_paths().vars() {
        let dirs: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
        println!("{var} += {}", dirs.join(", "));
    }
    println!();

    for group in session.graph().groups() {
        println!("group {} ({} targets):", group.name, group.generators.len());
        for spec in group.runners() {
            let exe = spec.executable.to_string_lossy();
            println!("  - {}", RunnerTask::new(spec.clone()));
            println!("      cmd: {}", session.options().invocation(&exe).join(" "));
            if let Some(mode) = spec.chmod {
                println!("      chmod: {mode:o}");
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
