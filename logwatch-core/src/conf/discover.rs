use crate::conf::error::ConfigError;
use glob::glob;
use std::path::{Path, PathBuf};

/// Expands the configured access-log patterns into concrete file paths.
///
/// Each pattern is expanded independently and its matches are sorted, so the
/// overall order follows the configuration. A pattern without glob
/// metacharacters is kept as a literal path even when the file does not exist
/// yet; the tailer retries opening it on every poll.
///
/// # Errors
///
/// Returns `ConfigError::Glob` if a pattern is malformed.
pub fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if !has_magic(pattern) {
            push_unique(&mut paths, PathBuf::from(pattern));
            continue;
        }

        let mut matches: Vec<PathBuf> = glob(pattern)
            .map_err(|e| ConfigError::Glob {
                pattern: pattern.clone(),
                source: e,
            })?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();

        matches.sort();
        for m in matches {
            push_unique(&mut paths, m);
        }
    }

    Ok(paths)
}

fn push_unique(paths: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !paths.iter().any(|p| p == &candidate) {
        paths.push(candidate);
    }
}

fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Joins a glob pattern to a root directory.
pub fn resolve_glob(root: &Path, pattern: &str) -> String {
    root.join(pattern).to_string_lossy().into_owned()
}
