//! In-memory sink
//!
//! Keeps every upload in order so tests can assert what was (or was not)
//! uploaded. Can be switched into a failing mode to simulate an outage.

use crate::error::{StackVaultError, StackVaultResult};
use crate::sink::{ArtifactLocation, ArtifactSink};
use std::cell::{Cell, RefCell};

/// A single recorded upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Sink recording uploads in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    bucket: String,
    uploads: RefCell<Vec<Upload>>,
    unavailable: Cell<bool>,
}

impl MemorySink {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Make every following upload fail with `StorageUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// All uploads so far, oldest first
    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.borrow().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.borrow().len()
    }
}

impl ArtifactSink for MemorySink {
    fn upload(&self, bytes: &[u8], suggested_name: &str) -> StackVaultResult<ArtifactLocation> {
        if self.unavailable.get() {
            return Err(StackVaultError::storage(suggested_name, "memory sink marked unavailable"));
        }

        self.uploads.borrow_mut().push(Upload {
            name: suggested_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(self.locate(&self.bucket, suggested_name))
    }

    fn locate(&self, bucket_name: &str, object_key: &str) -> ArtifactLocation {
        ArtifactLocation {
            bucket_name: bucket_name.to_string(),
            object_key: object_key.to_string(),
            http_url: format!("memory://{}/{}", bucket_name, object_key),
        }
    }

    fn sink_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_uploads_in_order() {
        let sink = MemorySink::new("b");
        sink.upload(b"1", "one.json").unwrap();
        sink.upload(b"2", "two.json").unwrap();

        let names: Vec<String> = sink.uploads().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["one.json", "two.json"]);
    }

    #[test]
    fn unavailable_rejects_and_records_nothing() {
        let sink = MemorySink::new("b");
        sink.set_unavailable(true);

        assert!(sink.upload(b"1", "one.json").is_err());
        assert_eq!(sink.upload_count(), 0);
    }
}
