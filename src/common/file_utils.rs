//! Shared filesystem helpers used across the analyzer.

use crate::analyzer::AnalysisConfig;
use crate::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Cap on individual file reads regardless of what a caller requests, so a
/// misconfigured `max_file_size` can't make analysis read gigabytes.
const HARD_READ_CAP: usize = 16 * 1024 * 1024;

/// True if `path` exists, is a regular file, and is not empty.
pub fn is_readable_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// Reads a file as UTF-8, refusing files larger than `max_size` (or
/// [`HARD_READ_CAP`], whichever is smaller).
pub fn read_file_safe(path: &Path, max_size: usize) -> Result<String> {
    let cap = max_size.min(HARD_READ_CAP);
    let meta = fs::metadata(path)?;
    if meta.len() as usize > cap {
        return Err(AppError::invalid_argument(format!(
            "{} exceeds the {}-byte read limit",
            path.display(),
            cap
        )));
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Resolves and sanity-checks a project root: it must exist and be a
/// directory. Returns the canonicalized path.
pub fn validate_project_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(AppError::invalid_argument(format!(
            "path does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(AppError::invalid_argument(format!(
            "not a directory: {}",
            path.display()
        )));
    }
    path.canonicalize().map_err(AppError::from)
}

fn should_skip_dir(name: &str, ignore_patterns: &[String]) -> bool {
    if name.starts_with('.') && name != "." && name != ".." {
        return true;
    }
    ignore_patterns.iter().any(|p| p == name)
}

/// Walks `root` depth-first, skipping ignored directories and dotfiles, and
/// returns every regular file found. Files larger than `config.max_file_size`
/// are skipped rather than erroring, since the caller is gathering a file
/// list for later targeted reads, not slurping content here.
pub fn collect_project_files(root: &Path, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .max_depth(12)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() {
                if let Some(name) = e.file_name().to_str() {
                    return e.depth() == 0 || !should_skip_dir(name, &config.ignore_patterns);
                }
            }
            true
        })
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match fs::metadata(path) {
            Ok(meta) if meta.len() as usize <= config.max_file_size => {
                files.push(path.to_path_buf());
            }
            _ => continue,
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn readable_file_requires_nonempty_regular_file() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "").unwrap();
        assert!(!is_readable_file(&empty));

        let nonempty = dir.path().join("content.txt");
        fs::write(&nonempty, "hi").unwrap();
        assert!(is_readable_file(&nonempty));

        assert!(!is_readable_file(&dir.path().join("missing.txt")));
    }

    #[test]
    fn read_file_safe_rejects_oversize() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "0123456789").unwrap();
        assert!(read_file_safe(&path, 4).is_err());
        assert_eq!(read_file_safe(&path, 100).unwrap(), "0123456789");
    }

    #[test]
    fn validate_project_path_rejects_missing_and_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "x").unwrap();

        assert!(validate_project_path(&file).is_err());
        assert!(validate_project_path(&dir.path().join("nope")).is_err());
        assert!(validate_project_path(dir.path()).is_ok());
    }

    #[test]
    fn collect_project_files_skips_ignored_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/built.rs"), "x").unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "x").unwrap();

        let config = AnalysisConfig::default();
        let files = collect_project_files(dir.path(), &config).unwrap();
        assert!(files.iter().any(|p| p.ends_with("main.rs")));
        assert!(!files.iter().any(|p| p.to_string_lossy().contains("target")));
        assert!(!files.iter().any(|p| p.to_string_lossy().contains(".git")));
    }
}
