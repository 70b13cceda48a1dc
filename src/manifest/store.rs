//! Manifest persistence
//!
//! `upsert` is a read-modify-write of the whole document with no locking.
//! Two build processes writing the same manifest at the same time can lose
//! one of the writes; the manifest is meant for a single writer at a time.

use crate::error::{StackVaultError, StackVaultResult};
use crate::manifest::{Manifest, VersionRecord};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest file name, relative to the working directory
pub const DEFAULT_MANIFEST_FILE: &str = "stackvault.versions.json";

/// Read/write access to the version manifest
pub trait ManifestStore {
    /// Load the manifest, empty if nothing has been recorded yet
    fn load(&self) -> StackVaultResult<Manifest>;

    /// Merge one record into the persisted manifest
    fn upsert(&self, record: &VersionRecord) -> StackVaultResult<()>;

    /// Look up a single record
    fn lookup(
        &self,
        product: &str,
        stack: &str,
        version: &str,
    ) -> StackVaultResult<Option<VersionRecord>> {
        Ok(self.load()?.lookup(product, stack, version))
    }
}

/// Manifest stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileManifestStore {
    path: PathBuf,
}

impl FileManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default file name in the current working directory
    pub fn in_working_dir() -> StackVaultResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| StackVaultError::io("getting current directory", e))?;
        Ok(Self::new(cwd.join(DEFAULT_MANIFEST_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, manifest: &Manifest) -> StackVaultResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StackVaultError::io(format!("creating directory {}", parent.display()), e)
                })?;
            }
        }

        let mut content = serde_json::to_string_pretty(manifest)?;
        content.push('\n');
        fs::write(&self.path, content).map_err(|e| {
            StackVaultError::io(format!("writing manifest {}", self.path.display()), e)
        })
    }
}

impl ManifestStore for FileManifestStore {
    fn load(&self) -> StackVaultResult<Manifest> {
        if !self.path.exists() {
            debug!("Manifest {} not found, starting empty", self.path.display());
            return Ok(Manifest::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            StackVaultError::io(format!("reading manifest {}", self.path.display()), e)
        })?;

        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| StackVaultError::CorruptManifest {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            "Loaded {} version(s) from {}",
            manifest.len(),
            self.path.display()
        );
        Ok(manifest)
    }

    fn upsert(&self, record: &VersionRecord) -> StackVaultResult<()> {
        // Re-read so entries written since our last load survive
        let mut manifest = self.load()?;
        manifest.insert(record);
        self.save(&manifest)?;

        info!(
            "Recorded {}/{}/{} ({}) in {}",
            record.product_name,
            record.stack_id,
            record.version_name,
            record.digest,
            self.path.display()
        );
        Ok(())
    }
}

/// Manifest held in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryManifestStore {
    manifest: RefCell<Manifest>,
    loads: Cell<usize>,
    writes: Cell<usize>,
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing manifest
    pub fn with_manifest(manifest: Manifest) -> Self {
        Self {
            manifest: RefCell::new(manifest),
            ..Self::default()
        }
    }

    /// Number of times the manifest was loaded
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    /// Number of upserts performed
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn snapshot(&self) -> Manifest {
        self.manifest.borrow().clone()
    }
}

impl ManifestStore for MemoryManifestStore {
    fn load(&self) -> StackVaultResult<Manifest> {
        self.loads.set(self.loads.get() + 1);
        Ok(self.manifest.borrow().clone())
    }

    fn upsert(&self, record: &VersionRecord) -> StackVaultResult<()> {
        self.writes.set(self.writes.get() + 1);
        self.manifest.borrow_mut().insert(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn record(version: &str, digest: &str) -> VersionRecord {
        VersionRecord {
            product_name: "P".to_string(),
            stack_id: "S".to_string(),
            version_name: version.to_string(),
            digest: digest.to_string(),
            description: format!("{} build", version),
            validate_template: true,
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileManifestStore::new(dir.path().join("versions.json"));

        assert!(store.load().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn load_corrupt_file_fails_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.json");
        fs::write(&path, "{ truncated").unwrap();

        let err = FileManifestStore::new(&path).load().unwrap_err();
        match err {
            StackVaultError::CorruptManifest { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected CorruptManifest, got {other:?}"),
        }
    }

    #[test]
    fn load_wrong_shape_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.json");
        fs::write(&path, r#"{"P": ["not", "a", "map"]}"#).unwrap();

        let err = FileManifestStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StackVaultError::CorruptManifest { .. }));
    }

    #[test]
    fn upsert_round_trip_preserves_siblings() {
        let dir = TempDir::new().unwrap();
        let store = FileManifestStore::new(dir.path().join("nested").join("versions.json"));

        store.upsert(&record("v1", "d1")).unwrap();
        let mut other = record("v1", "d9");
        other.product_name = "Q".to_string();
        store.upsert(&other).unwrap();

        store.upsert(&record("v2", "d2")).unwrap();

        let manifest = store.load().unwrap();
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.lookup("P", "S", "v1"), Some(record("v1", "d1")));
        assert_eq!(manifest.lookup("P", "S", "v2"), Some(record("v2", "d2")));
        assert_eq!(manifest.lookup("Q", "S", "v1").unwrap().digest, "d9");
    }

    #[test]
    fn upsert_keeps_entries_written_by_another_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.json");
        let first = FileManifestStore::new(&path);
        let second = FileManifestStore::new(&path);

        first.upsert(&record("v1", "d1")).unwrap();
        second.upsert(&record("v2", "d2")).unwrap();

        let manifest = first.load().unwrap();
        assert!(manifest.lookup("P", "S", "v1").is_some());
        assert!(manifest.lookup("P", "S", "v2").is_some());
    }

    #[test]
    fn upsert_onto_corrupt_file_fails_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.json");
        fs::write(&path, "garbage").unwrap();

        assert!(FileManifestStore::new(&path).upsert(&record("v1", "d1")).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");
    }

    #[test]
    fn lookup_through_store() {
        let dir = TempDir::new().unwrap();
        let store = FileManifestStore::new(dir.path().join("versions.json"));
        store.upsert(&record("v1", "d1")).unwrap();

        assert!(store.lookup("P", "S", "v1").unwrap().is_some());
        assert!(store.lookup("P", "S", "v3").unwrap().is_none());
    }

    #[test]
    #[serial]
    fn in_working_dir_uses_default_file() {
        let dir = TempDir::new().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let store = FileManifestStore::in_working_dir().unwrap();
        store.upsert(&record("v1", "d1")).unwrap();
        let exists = dir.path().join(DEFAULT_MANIFEST_FILE).exists();

        std::env::set_current_dir(original).unwrap();
        assert!(exists);
    }

    #[test]
    fn memory_store_counts_access() {
        let store = MemoryManifestStore::new();
        store.upsert(&record("v1", "d1")).unwrap();
        let manifest = store.load().unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.write_count(), 1);
    }
}
