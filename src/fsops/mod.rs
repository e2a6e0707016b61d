//! Path containment and atomic, idempotent file writes.
//!
//! These two primitives guard every repo-local write an MCP tool performs:
//! the AI host supplies paths, so containment has to be checked before any
//! syscall touches the filesystem, and writes have to be idempotent so a
//! re-run of a workflow step is a no-op rather than a fresh mtime bump.

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const FORBIDDEN_CHARS: &[char] = &['~', '$', '|', '>', '<', '&', ';', '`'];

/// Resolve `rel` against `root`, failing with [`AppError::PathEscape`] if the
/// result would land outside `root`.
///
/// Rejects absolute paths, `..` components that climb past the root (after
/// lexical normalization — this does not follow symlinks, callers that need
/// that guarantee should canonicalize `root` first), and any of the
/// characters a shell would treat specially if the path were later
/// interpolated into a command line.
pub fn resolve_in_root(root: &Path, rel: &str) -> Result<PathBuf> {
    if rel.is_empty() {
        return Err(AppError::PathEscape("empty path".into()));
    }
    if rel.contains("..") {
        return Err(AppError::PathEscape(format!("{rel} escapes workspace (contains ..)")));
    }
    if Path::new(rel).is_absolute() {
        return Err(AppError::PathEscape(format!("{rel} escapes workspace (absolute path)")));
    }
    if let Some(c) = rel.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(AppError::PathEscape(format!("{rel} contains forbidden character '{c}'")));
    }

    let root = normalize(root);
    let candidate = normalize(&root.join(rel));

    if !candidate.starts_with(&root) {
        return Err(AppError::PathEscape(format!("{rel} escapes workspace")));
    }

    Ok(candidate)
}

/// Lexically normalize a path: collapse `.` and resolve `..` without
/// touching the filesystem (no symlink following, no existence check).
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Result of [`atomic_write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub changed: bool,
    pub old_hash: Option<String>,
    pub new_hash: String,
}

/// Write `content` to `dest` atomically, short-circuiting if the destination
/// already holds byte-identical content.
///
/// 1. Hash `content` (SHA-256).
/// 2. If `dest` exists and hashes equal, return `changed = false` untouched.
/// 3. Ensure the parent directory exists (mode 0755).
/// 4. Write to `<dest>.tmp` then rename over `dest`; clean up the tmp file on
///    a failed rename so a crash never leaves a torn destination.
pub fn atomic_write(dest: &Path, content: &[u8], mode: u32) -> Result<WriteOutcome> {
    let new_hash = hex_sha256(content);

    let old_hash = if dest.exists() {
        let existing = fs::read(dest)?;
        Some(hex_sha256(&existing))
    } else {
        None
    };

    if old_hash.as_deref() == Some(new_hash.as_str()) {
        return Ok(WriteOutcome {
            changed: false,
            old_hash,
            new_hash,
        });
    }

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o755));
            }
        }
    }

    let tmp_path = tmp_path_for(dest);
    let write_result = (|| -> Result<()> {
        fs::write(&tmp_path, content)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode))?;
        }
        fs::rename(&tmp_path, dest)?;
        Ok(())
    })();

    if write_result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    write_result?;

    Ok(WriteOutcome {
        changed: true,
        old_hash,
        new_hash,
    })
}

fn tmp_path_for(dest: &Path) -> PathBuf {
    let mut os = dest.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Hex-encoded SHA-256 of `content`.
pub fn hex_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Dry-run plan for an apply tool: what would happen without touching disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct WritePlan {
    pub action: WriteAction,
    pub old_hash: Option<String>,
    pub new_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Create,
    Modify,
    Unchanged,
}

pub fn plan_write(dest: &Path, content: &[u8]) -> Result<WritePlan> {
    let new_hash = hex_sha256(content);
    if !dest.exists() {
        return Ok(WritePlan {
            action: WriteAction::Create,
            old_hash: None,
            new_hash,
        });
    }
    let old = fs::read(dest)?;
    let old_hash = hex_sha256(&old);
    let action = if old_hash == new_hash {
        WriteAction::Unchanged
    } else {
        WriteAction::Modify
    };
    Ok(WritePlan {
        action,
        old_hash: Some(old_hash),
        new_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_parent_traversal() {
        let dir = tempdir().unwrap();
        let err = resolve_in_root(dir.path(), "../../../etc/passwd").unwrap_err();
        assert!(matches!(err, AppError::PathEscape(_)));
    }

    #[test]
    fn rejects_absolute_path() {
        let dir = tempdir().unwrap();
        let err = resolve_in_root(dir.path(), "/etc/passwd").unwrap_err();
        assert!(matches!(err, AppError::PathEscape(_)));
    }

    #[test]
    fn rejects_forbidden_characters() {
        let dir = tempdir().unwrap();
        let err = resolve_in_root(dir.path(), "foo;rm -rf").unwrap_err();
        assert!(matches!(err, AppError::PathEscape(_)));
    }

    #[test]
    fn accepts_clean_relative_path() {
        let dir = tempdir().unwrap();
        let resolved = resolve_in_root(dir.path(), "Dockerfile").unwrap();
        assert_eq!(resolved, dir.path().join("Dockerfile"));
    }

    #[test]
    fn atomic_write_round_trips() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Dockerfile");
        let outcome = atomic_write(&dest, b"FROM scratch\n", 0o644).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.new_hash, hex_sha256(b"FROM scratch\n"));
        assert_eq!(fs::read(&dest).unwrap(), b"FROM scratch\n");
    }

    #[test]
    fn atomic_write_is_idempotent() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Dockerfile");
        atomic_write(&dest, b"FROM scratch\n", 0o644).unwrap();
        let mtime_before = fs::metadata(&dest).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = atomic_write(&dest, b"FROM scratch\n", 0o644).unwrap();
        let mtime_after = fs::metadata(&dest).unwrap().modified().unwrap();

        assert!(!second.changed);
        assert_eq!(mtime_before, mtime_after);
    }

    #[test]
    fn plan_write_reports_unchanged_without_touching_disk() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Dockerfile");
        atomic_write(&dest, b"FROM scratch\n", 0o644).unwrap();

        let plan = plan_write(&dest, b"FROM scratch\n").unwrap();
        assert_eq!(plan.action, WriteAction::Unchanged);
    }

    #[test]
    fn plan_write_reports_create_for_missing_file() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("Dockerfile");
        let plan = plan_write(&dest, b"FROM scratch\n").unwrap();
        assert_eq!(plan.action, WriteAction::Create);
        assert!(!dest.exists());
    }
}
