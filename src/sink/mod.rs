//! Artifact storage
//!
//! A sink uploads rendered template bytes to durable storage and reports
//! where they landed. Sinks never deduplicate and never retry; a failed
//! upload surfaces as `StorageUnavailable` and the whole synthesis pass is
//! expected to be retried by whoever drives it.

pub mod directory;
pub mod http;
pub mod memory;

pub use directory::DirectorySink;
pub use http::HttpSink;
pub use memory::MemorySink;

use crate::config::schema::{SinkConfig, SinkKind};
use crate::error::{StackVaultError, StackVaultResult};
use serde::Serialize;
use std::time::Duration;

/// Where an uploaded artifact lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    /// Bucket (or bucket-like root) holding the object
    pub bucket_name: String,

    /// Key of the object inside the bucket
    pub object_key: String,

    /// URL the artifact can be fetched from
    pub http_url: String,
}

/// Abstract artifact storage interface
pub trait ArtifactSink {
    /// Upload bytes under a suggested object name
    fn upload(&self, bytes: &[u8], suggested_name: &str) -> StackVaultResult<ArtifactLocation>;

    /// Location an upload of `object_key` into `bucket_name` would have.
    /// Performs no I/O.
    fn locate(&self, bucket_name: &str, object_key: &str) -> ArtifactLocation;

    /// Human-readable sink name for display
    fn sink_name(&self) -> &'static str;
}

/// Create the sink described by the configuration
pub fn create_sink(config: &SinkConfig) -> StackVaultResult<Box<dyn ArtifactSink>> {
    match config.kind {
        SinkKind::Directory => Ok(Box::new(DirectorySink::new(
            config.directory.clone(),
            config.bucket.clone(),
        ))),
        SinkKind::Http => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                StackVaultError::User("sink.endpoint is required when sink.kind = \"http\"".to_string())
            })?;
            Ok(Box::new(HttpSink::new(
                endpoint,
                config.bucket.clone(),
                Duration::from_secs(config.timeout_secs),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_directory_sink_by_default() {
        let sink = create_sink(&SinkConfig::default()).unwrap();
        assert_eq!(sink.sink_name(), "directory");
    }

    #[test]
    fn create_http_sink_requires_endpoint() {
        let config = SinkConfig {
            kind: SinkKind::Http,
            ..SinkConfig::default()
        };
        let err = create_sink(&config).err().unwrap();
        assert!(err.to_string().contains("sink.endpoint"));

        let config = SinkConfig {
            kind: SinkKind::Http,
            endpoint: Some("https://assets.example.com".to_string()),
            ..SinkConfig::default()
        };
        assert_eq!(create_sink(&config).unwrap().sink_name(), "http");
    }

    #[test]
    fn location_serializes_camel_case() {
        let location = ArtifactLocation {
            bucket_name: "b".to_string(),
            object_key: "k.json".to_string(),
            http_url: "file:///b/k.json".to_string(),
        };
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["bucketName"], "b");
        assert_eq!(json["objectKey"], "k.json");
        assert_eq!(json["httpUrl"], "file:///b/k.json");
    }
}
