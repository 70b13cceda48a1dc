//! Template snapshots and drift detection
//!
//! A snapshot is the on-disk copy of a version's rendered template, stored
//! as `{stack_path_id}.{stack_id}.{version}.template.json` in a snapshot
//! directory. For unlocked versions the snapshot simply follows the latest
//! build. For locked versions it is write-once: a build that renders a
//! different body for the same key fails instead of replacing it.
//!
//! # Reconcile outcomes
//!
//! | Existing snapshot | Same bytes | Locked | Result |
//! |-------------------|------------|--------|--------|
//! | none | - | - | written |
//! | present | yes | - | unchanged |
//! | present | no | no | overwritten |
//! | present | no | yes | `SnapshotDrift` |

use crate::error::{StackVaultError, StackVaultResult};
use crate::template::{Renderer, TemplateDocument};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default snapshot directory, relative to the working directory
pub const DEFAULT_SNAPSHOT_DIR: &str = "product-stack-snapshots";

/// Identifies one snapshot file
///
/// Only `version_name` may contain `.`; declarations are validated so that
/// distinct keys never map to the same file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub stack_path_id: String,
    pub stack_id: String,
    pub version_name: String,
}

impl SnapshotKey {
    pub fn new(
        stack_path_id: impl Into<String>,
        stack_id: impl Into<String>,
        version_name: impl Into<String>,
    ) -> Self {
        Self {
            stack_path_id: stack_path_id.into(),
            stack_id: stack_id.into(),
            version_name: version_name.into(),
        }
    }

    /// Snapshot file name for this key
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}.{}.template.json",
            self.stack_path_id, self.stack_id, self.version_name
        )
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.stack_path_id, self.stack_id, self.version_name
        )
    }
}

/// What `reconcile` did with the snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// No snapshot existed; fresh bytes were written
    Written,
    /// Snapshot already matched; nothing written
    Unchanged,
    /// Unlocked snapshot differed and was replaced
    Overwritten,
}

/// Guards the snapshots in one directory
#[derive(Debug, Clone)]
pub struct SnapshotGuard {
    directory: PathBuf,
}

impl SnapshotGuard {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of the snapshot file for `key`
    pub fn path_for(&self, key: &SnapshotKey) -> PathBuf {
        self.directory.join(key.file_name())
    }

    /// Read a stored snapshot, `None` if it does not exist
    pub fn read(&self, key: &SnapshotKey) -> StackVaultResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read(&path)
            .map(Some)
            .map_err(|e| StackVaultError::io(format!("reading snapshot {}", path.display()), e))
    }

    /// Compare fresh bytes with the stored snapshot and update it as allowed
    pub fn reconcile(
        &self,
        key: &SnapshotKey,
        fresh: &[u8],
        locked: bool,
    ) -> StackVaultResult<SnapshotOutcome> {
        let outcome = match self.read(key)? {
            None => SnapshotOutcome::Written,
            Some(previous) if previous == fresh => {
                debug!("Snapshot {} unchanged", key);
                return Ok(SnapshotOutcome::Unchanged);
            }
            Some(_) if locked => {
                warn!("Locked snapshot {} differs from fresh template", key);
                return Err(StackVaultError::SnapshotDrift {
                    version: key.version_name.clone(),
                    directory: self.directory.clone(),
                    file: key.file_name(),
                });
            }
            Some(_) => SnapshotOutcome::Overwritten,
        };

        self.write(key, fresh)?;
        match outcome {
            SnapshotOutcome::Written => info!("Wrote snapshot {}", self.path_for(key).display()),
            _ => info!("Replaced unlocked snapshot {}", self.path_for(key).display()),
        }
        Ok(outcome)
    }

    fn write(&self, key: &SnapshotKey, bytes: &[u8]) -> StackVaultResult<()> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            StackVaultError::io(
                format!("creating snapshot directory {}", self.directory.display()),
                e,
            )
        })?;

        let path = self.path_for(key);
        fs::write(&path, bytes)
            .map_err(|e| StackVaultError::io(format!("writing snapshot {}", path.display()), e))
    }
}

/// Renders a version by replaying its stored snapshot verbatim
#[derive(Debug, Clone)]
pub struct SnapshotTemplate {
    guard: SnapshotGuard,
    key: SnapshotKey,
}

impl SnapshotTemplate {
    pub fn new(directory: impl Into<PathBuf>, key: SnapshotKey) -> Self {
        Self {
            guard: SnapshotGuard::new(directory),
            key,
        }
    }
}

impl Renderer for SnapshotTemplate {
    fn render(&self) -> StackVaultResult<TemplateDocument> {
        match self.guard.read(&self.key)? {
            Some(bytes) => Ok(TemplateDocument::new(bytes)),
            None => Err(StackVaultError::render(
                self.key.version_name.clone(),
                format!(
                    "no snapshot {} in {}",
                    self.key.file_name(),
                    self.guard.directory().display()
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(version: &str) -> SnapshotKey {
        SnapshotKey::new("ProductPath", "Stack", version)
    }

    #[test]
    fn key_file_name() {
        assert_eq!(key("v1").file_name(), "ProductPath.Stack.v1.template.json");
    }

    #[test]
    fn first_write_wins() {
        let dir = TempDir::new().unwrap();
        let guard = SnapshotGuard::new(dir.path().join("snaps"));

        let outcome = guard.reconcile(&key("v1"), b"A", true).unwrap();

        assert_eq!(outcome, SnapshotOutcome::Written);
        assert_eq!(guard.read(&key("v1")).unwrap().unwrap(), b"A");
    }

    #[test]
    fn identical_unlocked_write_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let guard = SnapshotGuard::new(dir.path());

        guard.reconcile(&key("v1"), b"A", false).unwrap();
        let outcome = guard.reconcile(&key("v1"), b"A", false).unwrap();

        assert_eq!(outcome, SnapshotOutcome::Unchanged);
        assert_eq!(fs::read(guard.path_for(&key("v1"))).unwrap(), b"A");
    }

    #[test]
    fn locked_drift_fails_and_keeps_original() {
        let dir = TempDir::new().unwrap();
        let guard = SnapshotGuard::new(dir.path());
        guard.reconcile(&key("v1"), b"A", true).unwrap();

        let err = guard.reconcile(&key("v1"), b"B", true).unwrap_err();

        match &err {
            StackVaultError::SnapshotDrift {
                version, directory, ..
            } => {
                assert_eq!(version, "v1");
                assert_eq!(directory, dir.path());
            }
            other => panic!("expected SnapshotDrift, got {other:?}"),
        }
        assert_eq!(fs::read(guard.path_for(&key("v1"))).unwrap(), b"A");
    }

    #[test]
    fn locked_same_content_succeeds_without_writing() {
        let dir = TempDir::new().unwrap();
        let guard = SnapshotGuard::new(dir.path());
        guard.reconcile(&key("v1"), b"A", true).unwrap();
        let before = fs::metadata(guard.path_for(&key("v1")))
            .unwrap()
            .modified()
            .unwrap();

        let outcome = guard.reconcile(&key("v1"), b"A", true).unwrap();

        let after = fs::metadata(guard.path_for(&key("v1")))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(outcome, SnapshotOutcome::Unchanged);
        assert_eq!(before, after);
    }

    #[test]
    fn unlocked_drift_overwrites() {
        let dir = TempDir::new().unwrap();
        let guard = SnapshotGuard::new(dir.path());
        guard.reconcile(&key("v1"), b"A", false).unwrap();

        let outcome = guard.reconcile(&key("v1"), b"B", false).unwrap();

        assert_eq!(outcome, SnapshotOutcome::Overwritten);
        assert_eq!(guard.read(&key("v1")).unwrap().unwrap(), b"B");
    }

    #[test]
    fn renamed_version_gets_its_own_snapshot() {
        let dir = TempDir::new().unwrap();
        let guard = SnapshotGuard::new(dir.path());
        guard.reconcile(&key("v1"), b"A", true).unwrap();

        assert_eq!(
            guard.reconcile(&key("v2"), b"B", true).unwrap(),
            SnapshotOutcome::Written
        );
        assert_eq!(guard.read(&key("v1")).unwrap().unwrap(), b"A");
    }

    #[test]
    fn snapshot_template_replays_bytes() {
        let dir = TempDir::new().unwrap();
        SnapshotGuard::new(dir.path())
            .reconcile(&key("v1"), b"{\n  \"a\": 1\n}", true)
            .unwrap();

        let doc = SnapshotTemplate::new(dir.path(), key("v1")).render().unwrap();
        assert_eq!(doc.bytes(), b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn snapshot_template_missing_is_render_failure() {
        let dir = TempDir::new().unwrap();
        let err = SnapshotTemplate::new(dir.path(), key("v9"))
            .render()
            .unwrap_err();
        assert!(matches!(err, StackVaultError::RenderFailure { .. }));
    }
}
