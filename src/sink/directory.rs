//! Local directory sink
//!
//! Stores artifacts at `{root}/{bucket}/{object_key}`. Useful for local
//! builds and for inspecting exactly what would be uploaded.

use crate::error::{StackVaultError, StackVaultResult};
use crate::sink::{ArtifactLocation, ArtifactSink};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Sink writing artifacts into a bucket directory on the local filesystem
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    bucket: String,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    fn object_path(&self, bucket_name: &str, object_key: &str) -> PathBuf {
        self.root.join(bucket_name).join(object_key)
    }
}

impl ArtifactSink for DirectorySink {
    fn upload(&self, bytes: &[u8], suggested_name: &str) -> StackVaultResult<ArtifactLocation> {
        let path = self.object_path(&self.bucket, suggested_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StackVaultError::storage(
                    suggested_name,
                    format!("creating {}: {}", parent.display(), e),
                )
            })?;
        }

        fs::write(&path, bytes).map_err(|e| {
            StackVaultError::storage(suggested_name, format!("writing {}: {}", path.display(), e))
        })?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(self.locate(&self.bucket, suggested_name))
    }

    fn locate(&self, bucket_name: &str, object_key: &str) -> ArtifactLocation {
        let path = self.object_path(bucket_name, object_key);
        let path = std::path::absolute(&path).unwrap_or(path);

        ArtifactLocation {
            bucket_name: bucket_name.to_string(),
            object_key: object_key.to_string(),
            http_url: format!("file://{}", path.display()),
        }
    }

    fn sink_name(&self) -> &'static str {
        "directory"
    }
}
