// tests/end_to_end.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, write_script};

use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use testrun::config::load_and_validate;
use testrun::engine::Engine;
use testrun::fs::RealFileSystem;
use testrun::graph::BuildGraph;
use testrun::session::{BuildSession, SessionOptions};
use testrun::types::Platform;

type TestResult = std::result::Result<(), Box<dyn Error>>;

const MANIFEST: &str = r#"
[[group]]
name = "libs"

[[group.target]]
name = "foo"
link_output = "lib/libfoo.so"

[[group]]
name = "tests"

[[group.target]]
name = "test_env"
link_output = "bin/test_env"
run = true
test_inputs = ["fixtures/*.txt"]
chmod = 0o600

[[group.target]]
name = "test_fail"
link_output = "bin/test_fail"
run = true
"#;

#[tokio::test]
async fn real_binaries_see_search_path_and_fixtures() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    std::fs::create_dir_all(root.join("lib"))?;
    std::fs::write(root.join("lib/libfoo.so"), b"")?;
    std::fs::create_dir_all(root.join("fixtures"))?;
    std::fs::write(root.join("fixtures/greeting.txt"), b"hello fixture")?;
    write_script(
        &root.join("bin/test_env"),
        "cd \"$(dirname \"$0\")\"\nprintf '%s\\n' \"$LD_LIBRARY_PATH\"\ncat greeting.txt",
    )?;
    write_script(&root.join("bin/test_fail"), "echo oops >&2\nexit 4")?;

    let manifest_path = root.join("Testrun.toml");
    std::fs::write(&manifest_path, MANIFEST)?;

    let manifest = load_and_validate(&manifest_path)?;
    let graph = BuildGraph::from_manifest(&manifest, root, &RealFileSystem)?;
    let options = SessionOptions::try_from(manifest.options())?;
    let session = Arc::new(BuildSession::new(graph, options).with_platform(Platform::Unix));

    let outcome = Engine::new(Arc::clone(&session), 2).run().await?;
    assert!(outcome.is_success());
    assert_eq!(outcome.executed.len(), 2);

    let mut results = session.results().drain();
    results.sort_by(|a, b| a.name.cmp(&b.name));

    let env_result = &results[0];
    assert!(env_result.name.ends_with("bin/test_env"));
    assert_eq!(env_result.return_code, 0);
    // Output: "Running <cmd>", the child's LD_LIBRARY_PATH, the fixture.
    let lines: Vec<&str> = env_result.stdout.lines().collect();
    assert_eq!(lines.len(), 3, "stdout {:?}", env_result.stdout);

    // Composed directories come first, whatever this process inherited.
    let seen: Vec<PathBuf> = std::env::split_paths(lines[1]).collect();
    assert!(seen.len() >= 2, "search path {:?}", lines[1]);
    assert_eq!(seen[0], root.join("lib"));
    assert_eq!(seen[1], root.join("bin"));
    assert_eq!(lines[2], "hello fixture");

    // With a pinned inherited value, the full override is exactly known.
    let env = session
        .library_paths()
        .to_env_with(|_| Some(OsString::from("/usr/lib:/opt/lib")));
    let expected = std::env::join_paths([
        root.join("lib"),
        root.join("bin"),
        PathBuf::from("/usr/lib"),
        PathBuf::from("/opt/lib"),
    ])?;
    assert_eq!(env, vec![("LD_LIBRARY_PATH".to_string(), expected)]);
    assert_eq!(
        std::fs::read(root.join("bin/greeting.txt"))?,
        b"hello fixture"
    );

    let fail_result = &results[1];
    assert!(fail_result.name.ends_with("bin/test_fail"));
    assert_eq!(fail_result.return_code, -1);
    assert!(fail_result.stderr.contains("oops"));
    Ok(())
}
