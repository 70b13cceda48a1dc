//! JSON template sources
//!
//! Templates are serialized with two-space indentation and sorted object
//! keys, so an unchanged template always renders to the same bytes.

use crate::error::{StackVaultError, StackVaultResult};
use crate::template::{Renderer, TemplateDocument, VersionTracking};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Render a JSON value to canonical template bytes
pub fn render_value(value: &Value) -> StackVaultResult<TemplateDocument> {
    let body = serde_json::to_string_pretty(value)?;
    Ok(TemplateDocument::new(body))
}

/// An in-memory JSON template
#[derive(Debug, Clone)]
pub struct JsonTemplate {
    value: Value,
    tracking: Option<VersionTracking>,
}

impl JsonTemplate {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            tracking: None,
        }
    }

    /// Attach version tracking to this template
    pub fn with_tracking(mut self, tracking: VersionTracking) -> Self {
        self.tracking = Some(tracking);
        self
    }
}

impl Renderer for JsonTemplate {
    fn render(&self) -> StackVaultResult<TemplateDocument> {
        render_value(&self.value)
    }

    fn tracking(&self) -> Option<&VersionTracking> {
        self.tracking.as_ref()
    }
}

/// A JSON template file on disk
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
    tracking: Option<VersionTracking>,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tracking: None,
        }
    }

    /// Attach version tracking to this template
    pub fn with_tracking(mut self, tracking: VersionTracking) -> Self {
        self.tracking = Some(tracking);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Renderer for TemplateFile {
    fn render(&self) -> StackVaultResult<TemplateDocument> {
        debug!("Rendering template file {}", self.path.display());

        let content = fs::read_to_string(&self.path).map_err(|e| {
            StackVaultError::render(
                self.path.display().to_string(),
                format!("reading template: {}", e),
            )
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            StackVaultError::render(
                self.path.display().to_string(),
                format!("parsing template: {}", e),
            )
        })?;

        render_value(&value)
    }

    fn tracking(&self) -> Option<&VersionTracking> {
        self.tracking.as_ref()
    }
}
