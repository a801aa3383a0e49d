// tests/staging.rs

use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tempfile::tempdir;

use testrun::errors::RunnerError;
use testrun::fs::mock::MockFileSystem;
use testrun::fs::{FileSystem, RealFileSystem};
use testrun::runner::stage::{stage_test_inputs, staged_path};

#[test]
fn staged_path_is_next_to_executable() {
    assert_eq!(
        staged_path(Path::new("build/tests/test_foo"), Path::new("data/in.bin")),
        Some(PathBuf::from("build/tests/in.bin"))
    );
    // Bare executable name: stage into the current directory.
    assert_eq!(
        staged_path(Path::new("test_foo"), Path::new("data/in.bin")),
        Some(PathBuf::from("./in.bin"))
    );
}

#[test]
fn stages_every_input_with_mode() {
    let fs = MockFileSystem::new();
    fs.add_file("./data/a.txt", b"alpha".to_vec());
    fs.add_file("./data/nested/b.bin", vec![0u8, 1, 2, 255]);

    let staged = stage_test_inputs(
        &fs,
        Path::new("./build/test_foo"),
        &[
            PathBuf::from("./data/a.txt"),
            PathBuf::from("./data/nested/b.bin"),
        ],
        Some(0o640),
    )
    .unwrap();

    assert_eq!(
        staged,
        vec![PathBuf::from("./build/a.txt"), PathBuf::from("./build/b.bin")]
    );
    assert_eq!(fs.contents("./build/a.txt").unwrap(), b"alpha");
    assert_eq!(fs.contents("./build/b.bin").unwrap(), vec![0u8, 1, 2, 255]);
    assert_eq!(fs.mode_of("./build/a.txt"), Some(0o640));
    assert_eq!(fs.mode_of("./build/b.bin"), Some(0o640));
}

#[test]
fn no_mode_leaves_permissions_alone() {
    let fs = MockFileSystem::new();
    fs.add_file("./data/a.txt", b"alpha".to_vec());

    stage_test_inputs(
        &fs,
        Path::new("./build/test_foo"),
        &[PathBuf::from("./data/a.txt")],
        None,
    )
    .unwrap();

    assert_eq!(fs.mode_of("./build/a.txt"), None);
}

#[test]
fn missing_source_is_a_stage_error() {
    let fs = MockFileSystem::new();

    let err = stage_test_inputs(
        &fs,
        Path::new("./build/test_foo"),
        &[PathBuf::from("./data/missing.txt")],
        None,
    )
    .unwrap_err();

    match err {
        RunnerError::Stage { src, dst, .. } => {
            assert_eq!(src, PathBuf::from("./data/missing.txt"));
            assert_eq!(dst, PathBuf::from("./build/missing.txt"));
        }
        other => panic!("expected Stage error, got {other:?}"),
    }
    assert!(!fs.exists(Path::new("./build/missing.txt")));
}

#[test]
fn unwritable_destination_is_a_stage_error() {
    let fs = MockFileSystem::new();
    fs.add_file("./data/a.txt", b"alpha".to_vec());
    fs.deny_writes("./build/a.txt");

    let err = stage_test_inputs(
        &fs,
        Path::new("./build/test_foo"),
        &[PathBuf::from("./data/a.txt")],
        None,
    )
    .unwrap_err();

    assert!(matches!(err, RunnerError::Stage { .. }));
}

#[test]
fn real_filesystem_copy_is_byte_identical() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("fixtures").join("blob.dat");
    std::fs::create_dir_all(src.parent().unwrap()).unwrap();
    let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    std::fs::write(&src, &payload).unwrap();

    let exe = dir.path().join("build").join("test_blob");
    let staged = stage_test_inputs(&RealFileSystem, &exe, &[src.clone()], None).unwrap();

    assert_eq!(staged, vec![dir.path().join("build").join("blob.dat")]);
    assert_eq!(std::fs::read(&staged[0]).unwrap(), payload);
}

#[cfg(unix)]
#[test]
fn real_filesystem_applies_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let src = dir.path().join("in.txt");
    std::fs::write(&src, b"x").unwrap();
    let exe = dir.path().join("out").join("test_x");

    let staged = stage_test_inputs(&RealFileSystem, &exe, &[src], Some(0o600)).unwrap();

    let mode = std::fs::metadata(&staged[0]).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

proptest! {
    #[test]
    fn staging_preserves_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let fs = MockFileSystem::new();
        fs.add_file("./src/data.bin", bytes.clone());

        let staged = stage_test_inputs(
            &fs,
            Path::new("./out/test_bin"),
            &[PathBuf::from("./src/data.bin")],
            None,
        )
        .unwrap();

        prop_assert_eq!(staged.len(), 1);
        prop_assert_eq!(staged[0].file_name(), Path::new("./src/data.bin").file_name());
        prop_assert_eq!(fs.contents(&staged[0]).unwrap(), bytes);
    }
}
