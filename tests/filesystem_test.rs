//! Tests for the real FileSystem implementation

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use gdst::infrastructure::traits::{FileSystem, RealFileSystem};

// ============================================================
// write_atomic
// ============================================================

#[test]
fn given_new_path_when_write_atomic_then_file_created_with_content() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("session");
    let fs_impl = RealFileSystem;

    // Act
    fs_impl.write_atomic(&target, "/work/chip.gds\n").unwrap();

    // Assert
    assert_eq!(fs::read_to_string(&target).unwrap(), "/work/chip.gds\n");
}

#[test]
fn given_existing_file_when_write_atomic_then_content_replaced() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("session");
    fs::write(&target, "old value\n").unwrap();
    let fs_impl = RealFileSystem;

    // Act
    fs_impl.write_atomic(&target, "new value\n").unwrap();

    // Assert
    assert_eq!(fs::read_to_string(&target).unwrap(), "new value\n");
}

#[test]
fn given_write_atomic_then_no_temp_file_left_behind() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("session");
    let fs_impl = RealFileSystem;

    // Act
    fs_impl.write_atomic(&target, "value\n").unwrap();

    // Assert: only the target remains in the directory
    let entries: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("session")]);
}

#[test]
fn given_missing_parent_when_write_atomic_then_returns_error() {
    // Arrange: write_atomic does not create directories itself
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("missing/session");
    let fs_impl = RealFileSystem;

    // Act
    let result = fs_impl.write_atomic(&target, "value\n");

    // Assert
    assert!(result.is_err());
}

// ============================================================
// is_file
// ============================================================

#[test]
fn given_regular_file_when_is_file_then_true() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("chip.gds");
    fs::write(&file, "bytes").unwrap();

    assert!(RealFileSystem.is_file(&file));
}

#[test]
fn given_directory_when_is_file_then_false() {
    let temp = TempDir::new().unwrap();

    assert!(!RealFileSystem.is_file(temp.path()));
}

#[test]
fn given_missing_path_when_is_file_then_false() {
    let temp = TempDir::new().unwrap();

    assert!(!RealFileSystem.is_file(&temp.path().join("nonexistent")));
}

// ============================================================
// canonicalize
// ============================================================

#[test]
fn given_dotted_path_when_canonicalize_then_components_resolved() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("chip.gds");
    fs::write(&file, "bytes").unwrap();
    let dotted = temp.path().join(".").join("chip.gds");

    // Act
    let canonical = RealFileSystem.canonicalize(&dotted).unwrap();

    // Assert
    assert!(canonical.is_absolute());
    assert_eq!(canonical, fs::canonicalize(&file).unwrap());
}

#[test]
fn given_missing_path_when_canonicalize_then_returns_error() {
    let temp = TempDir::new().unwrap();

    let result = RealFileSystem.canonicalize(&temp.path().join("nonexistent"));

    assert!(result.is_err());
}

// ============================================================
// ensure_parent
// ============================================================

#[test]
fn given_nested_path_when_ensure_parent_then_creates_ancestors() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a/b/c/session");

    // Act
    RealFileSystem.ensure_parent(&nested).unwrap();

    // Assert: ancestors exist, the file itself is not created
    let parent = nested.parent().unwrap();
    assert!(parent.is_dir());
    assert!(!nested.exists());
}

#[test]
fn given_existing_parent_when_ensure_parent_then_succeeds() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("session");

    assert!(RealFileSystem.ensure_parent(&file).is_ok());
}

#[test]
fn given_bare_name_when_ensure_parent_then_no_op() {
    assert!(RealFileSystem.ensure_parent(Path::new("session")).is_ok());
}
