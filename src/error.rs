//! Error types for stackvault
//!
//! All modules use `StackVaultResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stackvault operations
pub type StackVaultResult<T> = Result<T, StackVaultError>;

/// All errors that can occur in stackvault
#[derive(Error, Debug)]
pub enum StackVaultError {
    // Synthesis errors
    #[error("Failed to render template for version {version}: {reason}")]
    RenderFailure { version: String, reason: String },

    #[error("Artifact storage unavailable while uploading {name}: {reason}")]
    StorageUnavailable { name: String, reason: String },

    #[error("Corrupt version manifest at {path}: {reason}")]
    CorruptManifest { path: PathBuf, reason: String },

    #[error(
        "Template has changed for locked version {version}. A snapshot of {version} already \
         exists in {directory}. Either rename the version to publish the change, or delete \
         {directory}/{file} if {version} was never deployed."
    )]
    SnapshotDrift {
        version: String,
        directory: PathBuf,
        file: String,
    },

    // Resolution errors
    #[error(
        "No storage bucket known for stack {stack} of product {product}; \
         cannot resolve version {version} from history"
    )]
    MissingBaseArtifact {
        product: String,
        stack: String,
        version: String,
    },

    #[error("Duplicate version {version} for product {product} (stack {stack})")]
    DuplicateVersion {
        product: String,
        stack: String,
        version: String,
    },

    #[error("Version {version} not found in manifest for product {product}, stack {stack}")]
    VersionNotFound {
        product: String,
        stack: String,
        version: String,
    },

    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl StackVaultError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a render failure for a version
    pub fn render(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RenderFailure {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create a storage error for an upload
    pub fn storage(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Check if the outer build may retry the whole synthesis pass
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::SnapshotDrift { .. } => {
                Some("Bump the version name, or remove the stale snapshot file and rebuild")
            }
            Self::VersionNotFound { .. } => {
                Some("Build the version fresh once with --record before reusing it from history")
            }
            Self::MissingBaseArtifact { .. } => {
                Some("Set [stacks.<stack>] bucket in stackvault.toml, or build one version of the stack fresh")
            }
            Self::CorruptManifest { .. } => {
                Some("Fix or remove the manifest file; it is rebuilt by stackvault synth --record")
            }
            Self::StorageUnavailable { .. } => Some("Check the sink configuration and retry"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_drift_names_version_and_directory() {
        let err = StackVaultError::SnapshotDrift {
            version: "v2".to_string(),
            directory: PathBuf::from("product-stack-snapshots"),
            file: "P.S.v2.template.json".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("locked version v2"));
        assert!(msg.contains("product-stack-snapshots"));
        assert!(msg.contains("rename the version"));
    }

    #[test]
    fn resolution_errors_name_all_identifiers() {
        let err = StackVaultError::VersionNotFound {
            product: "P".to_string(),
            stack: "S".to_string(),
            version: "v1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("v1"));
        assert!(msg.contains("product P"));
        assert!(msg.contains("stack S"));
    }

    #[test]
    fn error_hint() {
        let err = StackVaultError::MissingBaseArtifact {
            product: "P".to_string(),
            stack: "S".to_string(),
            version: "v1".to_string(),
        };
        assert!(err.hint().unwrap().contains("bucket"));
        assert!(StackVaultError::User("x".to_string()).hint().is_none());
    }

    #[test]
    fn error_retryable() {
        assert!(StackVaultError::storage("a.json", "timeout").is_retryable());
        assert!(!StackVaultError::render("v1", "bad").is_retryable());
    }
}
