//! Render request payload and validation

use serde::{Deserialize, Serialize};

/// Body of `POST /api/render` and the sidecar's `POST /render`
///
/// Missing fields decode as empty strings so the validator, not the JSON
/// decoder, reports which one is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderRequest {
    /// XSL-FO stylesheet source
    #[serde(default)]
    pub xsl: String,
    /// XML data source
    #[serde(default)]
    pub xml: String,
}

/// Validation failures, checked in field order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("xsl is required")]
    MissingXsl,

    #[error("xml is required")]
    MissingXml,
}

impl RenderRequest {
    pub fn new(xsl: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            xsl: xsl.into(),
            xml: xml.into(),
        }
    }

    /// Reject the request before any rendering work is spent on it
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.xsl.is_empty() {
            return Err(ValidationError::MissingXsl);
        }
        if self.xml.is_empty() {
            return Err(ValidationError::MissingXml);
        }
        Ok(())
    }
}
