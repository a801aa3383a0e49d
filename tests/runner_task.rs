// tests/runner_task.rs

mod common;
use crate::common::{fake_session, graph_with, init_tracing, FakeInvoker};

use std::path::PathBuf;

use testrun::errors::RunnerError;
use testrun::fs::mock::MockFileSystem;
use testrun::graph::{RunnerSpec, Verdict};
use testrun::runner::format::CommandTemplate;
use testrun::runner::{RunnerState, RunnerTask};
use testrun::session::SessionOptions;

fn spec() -> RunnerSpec {
    RunnerSpec::new("test_foo", "/b/tests/test_foo")
}

fn graph() -> testrun::graph::BuildGraph {
    graph_with(&[("foo", "/b/lib/libfoo.so")], vec![spec()])
}

#[test]
fn runs_binary_and_records_result() {
    init_tracing();
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let session = fake_session(graph(), SessionOptions::default(), Verdict::Run, &fs, &invoker);

    let mut task = RunnerTask::new(spec());
    assert_eq!(task.state(), RunnerState::Pending);

    let state = task.execute(&session).unwrap();
    assert_eq!(state, RunnerState::Done);
    assert_eq!(task.state(), RunnerState::Done);

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].argv, vec!["/b/tests/test_foo"]);

    let results = session.results().snapshot();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "/b/tests/test_foo");
    assert_eq!(results[0].return_code, 0);
    assert_eq!(results[0].stdout, "Running /b/tests/test_foo\nok /b/tests/test_foo\n");
}

#[test]
fn nonzero_exit_is_recorded_not_raised() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new().exit_with("/b/tests/test_foo", 3);
    let session = fake_session(graph(), SessionOptions::default(), Verdict::Run, &fs, &invoker);

    let state = RunnerTask::new(spec()).execute(&session).unwrap();

    assert_eq!(state, RunnerState::Done);
    let results = session.results().snapshot();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].return_code, -1);
}

#[test]
fn skip_verdict_spawns_nothing() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let session = fake_session(graph(), SessionOptions::default(), Verdict::Skip, &fs, &invoker);

    let mut task = RunnerTask::new(spec());
    assert_eq!(task.runnable_status(&session).unwrap(), Verdict::Skip);

    let state = task.execute(&session).unwrap();
    assert_eq!(state, RunnerState::Skipped);
    assert_eq!(invoker.call_count(), 0);
    assert!(session.results().is_empty());
}

#[test]
fn run_always_overrides_skip() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let options = SessionOptions {
        run_always: true,
        ..SessionOptions::default()
    };
    let session = fake_session(graph(), options, Verdict::Skip, &fs, &invoker);

    let mut task = RunnerTask::new(spec());
    assert_eq!(task.runnable_status(&session).unwrap(), Verdict::Run);
    assert_eq!(task.execute(&session).unwrap(), RunnerState::Done);
    assert_eq!(invoker.call_count(), 1);
    assert_eq!(session.results().len(), 1);
}

#[test]
fn terminal_task_is_not_executed_twice() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let session = fake_session(graph(), SessionOptions::default(), Verdict::Run, &fs, &invoker);

    let mut task = RunnerTask::new(spec());
    task.execute(&session).unwrap();
    task.execute(&session).unwrap();

    assert_eq!(invoker.call_count(), 1);
    assert_eq!(session.results().len(), 1);
}

#[test]
fn wrapper_template_and_benchmark_file() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let options = SessionOptions {
        run_cmd: Some(CommandTemplate::parse("valgrind --error-exitcode=1 %s").unwrap()),
        run_benchmark: true,
        python_result: Some(PathBuf::from("/tmp/out.json")),
        ..SessionOptions::default()
    };
    let session = fake_session(graph(), options, Verdict::Run, &fs, &invoker);

    RunnerTask::new(spec()).execute(&session).unwrap();

    let calls = invoker.calls();
    assert_eq!(
        calls[0].argv,
        vec![
            "valgrind",
            "--error-exitcode=1",
            "/b/tests/test_foo",
            "--pyfile=/tmp/out.json",
        ]
    );

    // The result is named by the formatted command, without the result file.
    let results = session.results().snapshot();
    assert_eq!(results[0].name, "valgrind --error-exitcode=1 /b/tests/test_foo");
}

#[test]
fn result_file_is_ignored_outside_benchmark_mode() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let options = SessionOptions {
        python_result: Some(PathBuf::from("/tmp/out.json")),
        ..SessionOptions::default()
    };
    let session = fake_session(graph(), options, Verdict::Run, &fs, &invoker);

    RunnerTask::new(spec()).execute(&session).unwrap();

    assert_eq!(invoker.calls()[0].argv, vec!["/b/tests/test_foo"]);
}

#[test]
fn child_gets_library_search_path() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let session = fake_session(graph(), SessionOptions::default(), Verdict::Run, &fs, &invoker);

    RunnerTask::new(spec()).execute(&session).unwrap();

    let env = &invoker.calls()[0].env;
    let (_, value) = env
        .iter()
        .find(|(k, _)| k == "LD_LIBRARY_PATH")
        .expect("LD_LIBRARY_PATH override");
    let paths: Vec<PathBuf> = std::env::split_paths(value).collect();
    assert_eq!(paths[0], PathBuf::from("/b/lib"));
    assert_eq!(paths[1], PathBuf::from("/b/tests"));
}

#[test]
fn test_inputs_are_staged_before_execution() {
    let fs = MockFileSystem::new();
    fs.add_file("/src/data/input.txt", b"payload".to_vec());
    let invoker = FakeInvoker::new();

    let spec = spec()
        .with_test_inputs(["/src/data/input.txt"])
        .with_chmod(0o644);
    let graph = graph_with(&[], vec![spec.clone()]);
    let session = fake_session(graph, SessionOptions::default(), Verdict::Run, &fs, &invoker);

    RunnerTask::new(spec).execute(&session).unwrap();

    assert_eq!(fs.contents("/b/tests/input.txt").unwrap(), b"payload");
    assert_eq!(fs.mode_of("/b/tests/input.txt"), Some(0o644));
    assert_eq!(invoker.call_count(), 1);
}

#[test]
fn staging_failure_aborts_without_running_or_logging() {
    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();

    let spec = spec().with_test_inputs(["/src/data/missing.txt"]);
    let graph = graph_with(&[], vec![spec.clone()]);
    let session = fake_session(graph, SessionOptions::default(), Verdict::Run, &fs, &invoker);

    let mut task = RunnerTask::new(spec);
    let err = task.execute(&session).unwrap_err();

    assert!(matches!(err, RunnerError::Stage { .. }));
    assert_eq!(task.state(), RunnerState::Staging);
    assert_eq!(invoker.call_count(), 0);
    assert!(session.results().is_empty());
}

#[test]
fn save_result_merges_several_invocations() {
    use testrun::runner::ExecutionResult;

    let fs = MockFileSystem::new();
    let invoker = FakeInvoker::new();
    let session = fake_session(graph(), SessionOptions::default(), Verdict::Run, &fs, &invoker);

    let run = |code: i32, out: &str| ExecutionResult {
        command: vec!["/b/tests/test_foo".to_string()],
        exit_code: code,
        stdout: out.as_bytes().to_vec(),
        stderr: Vec::new(),
    };

    let passed = RunnerTask::new(spec()).save_result(&session, &[run(0, "first"), run(1, "second")]);
    assert!(!passed);

    let results = session.results().snapshot();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].return_code, -1);
    assert_eq!(
        results[0].stdout,
        "Running /b/tests/test_foo\nfirst\nRunning /b/tests/test_foo\nsecond\n"
    );
}

#[test]
fn display_lists_outputs_and_inputs() {
    let task = RunnerTask::new(spec().with_test_inputs(["/src/a.txt", "/src/b.txt"]));
    assert_eq!(
        task.to_string(),
        "runner: /b/tests/test_foo -> /b/tests/a.txt /b/tests/b.txt {test input: /src/a.txt /src/b.txt}"
    );

    assert_eq!(RunnerTask::new(spec()).to_string(), "runner: /b/tests/test_foo");
}
