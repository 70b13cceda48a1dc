//! Template rendering boundary
//!
//! A renderer turns some template source into a [`TemplateDocument`]: the
//! immutable bytes that get hashed, snapshotted and uploaded. The resource
//! model behind a renderer is not this crate's concern.

pub mod json;

pub use json::{JsonTemplate, TemplateFile};

use crate::error::StackVaultResult;
use crate::hashing;
use std::fmt;
use std::path::PathBuf;

/// One rendered template body and its content digest
#[derive(Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    bytes: Vec<u8>,
    digest: String,
}

impl TemplateDocument {
    /// Wrap rendered bytes, computing the digest once
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let digest = hashing::digest(&bytes);
        Self { bytes, digest }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for TemplateDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateDocument")
            .field("len", &self.bytes.len())
            .field("digest", &self.digest)
            .finish()
    }
}

/// Version tracking attached to a template source ahead of synthesis
///
/// Fills in lock and snapshot directory for declarations that leave them
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTracking {
    /// Treat the snapshot as an integrity contract
    pub locked: bool,

    /// Snapshot directory override
    pub snapshot_dir: Option<PathBuf>,
}

/// Something that can produce a template document
pub trait Renderer: fmt::Debug {
    /// Render the template body
    fn render(&self) -> StackVaultResult<TemplateDocument>;

    /// Version tracking attached to this source, if any
    fn tracking(&self) -> Option<&VersionTracking> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_digest_matches_bytes() {
        let doc = TemplateDocument::new("{}");
        assert_eq!(doc.digest(), hashing::digest(b"{}"));
        assert_eq!(doc.len(), 2);
        assert!(!doc.is_empty());
    }

    #[test]
    fn identical_bodies_compare_equal() {
        assert_eq!(TemplateDocument::new("a"), TemplateDocument::new(b"a".to_vec()));
        assert_ne!(TemplateDocument::new("a"), TemplateDocument::new("b"));
    }
}
