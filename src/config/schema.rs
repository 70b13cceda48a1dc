//! Configuration schema for stackvault
//!
//! Configuration is read from `./stackvault.toml`, falling back to
//! `~/.config/stackvault/config.toml`.

use crate::manifest::DEFAULT_MANIFEST_FILE;
use crate::snapshot::DEFAULT_SNAPSHOT_DIR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Version manifest settings
    pub manifest: ManifestConfig,

    /// Snapshot settings
    pub snapshot: SnapshotConfig,

    /// Artifact storage settings
    pub sink: SinkConfig,

    /// Per-stack settings, keyed by stack id
    pub stacks: BTreeMap<String, StackConfig>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable the synthesis journal
    pub journal: bool,

    /// Journal file location
    pub journal_path: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            journal: true,
            journal_path: PathBuf::from(".stackvault").join("journal.log"),
        }
    }
}

/// Version manifest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifest file location
    pub path: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MANIFEST_FILE),
        }
    }
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory for versions that do not name their own
    pub directory: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
        }
    }
}

/// Kind of artifact storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Local directory, one subdirectory per bucket
    #[default]
    Directory,
    /// HTTP object store accepting PUT
    Http,
}

/// Artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,

    /// Bucket fresh artifacts are uploaded to
    pub bucket: String,

    /// Root directory for the directory sink
    pub directory: PathBuf,

    /// Base URL for the http sink
    pub endpoint: Option<String>,

    /// Request timeout for the http sink
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Directory,
            bucket: "product-stack-assets".to_string(),
            directory: PathBuf::from("stackvault.out").join("assets"),
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// Per-stack configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Bucket a previous build stored this stack's artifacts in
    pub bucket: Option<String>,
}
