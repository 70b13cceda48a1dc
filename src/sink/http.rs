//! HTTP sink
//!
//! PUTs artifacts to `{endpoint}/{bucket}/{object_key}`, which is the shape
//! accepted by path-style object stores and most artifact proxies.

use crate::error::{StackVaultError, StackVaultResult};
use crate::sink::{ArtifactLocation, ArtifactSink};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Sink uploading artifacts with plain HTTP PUT requests
pub struct HttpSink {
    endpoint: String,
    bucket: String,
    agent: ureq::Agent,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            agent,
        }
    }

    fn object_url(&self, bucket_name: &str, object_key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, bucket_name, object_key)
    }
}

impl fmt::Debug for HttpSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSink")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl ArtifactSink for HttpSink {
    fn upload(&self, bytes: &[u8], suggested_name: &str) -> StackVaultResult<ArtifactLocation> {
        let url = self.object_url(&self.bucket, suggested_name);
        debug!("PUT {} ({} bytes)", url, bytes.len());

        // Non-2xx responses come back as errors from ureq
        self.agent
            .put(&url)
            .header("Content-Type", "application/json")
            .send(bytes)
            .map_err(|e| StackVaultError::storage(suggested_name, format!("PUT {}: {}", url, e)))?;

        info!("Uploaded {}", url);
        Ok(self.locate(&self.bucket, suggested_name))
    }

    fn locate(&self, bucket_name: &str, object_key: &str) -> ArtifactLocation {
        ArtifactLocation {
            bucket_name: bucket_name.to_string(),
            object_key: object_key.to_string(),
            http_url: self.object_url(bucket_name, object_key),
        }
    }

    fn sink_name(&self) -> &'static str {
        "http"
    }
}
