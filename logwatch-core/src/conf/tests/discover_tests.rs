use crate::conf::error::ConfigError;
use crate::conf::{expand_globs, resolve_glob};

use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn pattern(root: &Path, glob: &str) -> Vec<String> {
    vec![resolve_glob(root, glob)]
}

#[test]
fn expand_globs_finds_matching_files() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("access.log"), "").unwrap();
    fs::write(root.join("other.log"), "").unwrap();
    fs::write(root.join("error.txt"), "").unwrap();

    // Act
    let result = expand_globs(&pattern(root, "*.log")).unwrap();

    // Assert
    assert_eq!(result, vec![root.join("access.log"), root.join("other.log")]);
}

#[test]
fn expand_globs_keeps_configuration_order_across_patterns() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("a.log"), "").unwrap();
    fs::write(root.join("z.log"), "").unwrap();

    let patterns = vec![
        resolve_glob(root, "z.*"),
        resolve_glob(root, "a.*"),
    ];

    // Act
    let result = expand_globs(&patterns).unwrap();

    // Assert
    assert_eq!(result, vec![root.join("z.log"), root.join("a.log")]);
}

#[test]
fn expand_globs_deduplicates_overlapping_patterns() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("access.log"), "").unwrap();

    let patterns = vec![resolve_glob(root, "*.log"), resolve_glob(root, "access.*")];

    // Act
    let result = expand_globs(&patterns).unwrap();

    // Assert
    assert_eq!(result, vec![root.join("access.log")]);
}

#[test]
fn expand_globs_keeps_literal_path_that_does_not_exist_yet() {
    // Arrange
    let dir = tempdir().unwrap();
    let missing = dir.path().join("not-created-yet.log");

    // Act
    let result = expand_globs(&[missing.to_string_lossy().into_owned()]).unwrap();

    // Assert
    assert_eq!(result, vec![missing]);
}

#[test]
fn expand_globs_filters_out_directories() {
    // Arrange
    let dir = tempdir().unwrap();
    let root = dir.path();

    fs::create_dir(root.join("archive.log")).unwrap();

    // Act
    let result = expand_globs(&pattern(root, "*.log")).unwrap();

    // Assert
    assert!(result.is_empty());
}

#[test]
fn expand_globs_returns_error_for_invalid_pattern() {
    // Act
    let err = expand_globs(&["/var/log/[".to_string()]).unwrap_err();

    // Assert
    match err {
        ConfigError::Glob { pattern, .. } => {
            assert!(pattern.contains('['));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn resolve_glob_joins_root_and_pattern() {
    // Arrange
    let root = Path::new("/var/log/nginx");

    // Act
    let resolved = resolve_glob(root, "*.log");

    // Assert
    assert_eq!(resolved, "/var/log/nginx/*.log");
}
