//! Render Providers
//!
//! Defines the renderer trait with the stub and remote sidecar backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;

use super::types::{RenderContext, RenderError, RendererKind};
use crate::pdf::build_simple_pdf;

/// Client timeout for calls to the FOP sidecar
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Renderer trait
///
/// Turns an XSL-FO stylesheet and an XML document into PDF bytes. Callers
/// do not know which backend is in effect.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Get the backend type
    fn kind(&self) -> RendererKind;

    /// Render the document, or fail with a [`RenderError`]
    ///
    /// Must give up with `Cancelled` or `DeadlineExceeded` when `ctx` ends
    /// before the backend finishes; partial output is never returned.
    async fn render(&self, ctx: &RenderContext, xsl: &str, xml: &str)
        -> Result<Vec<u8>, RenderError>;
}

/// Placeholder renderer for local development
///
/// Ignores the payload and returns a one-page PDF listing the input sizes.
#[derive(Debug, Default, Clone)]
pub struct StubRenderer;

impl StubRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Stub
    }

    async fn render(
        &self,
        ctx: &RenderContext,
        xsl: &str,
        xml: &str,
    ) -> Result<Vec<u8>, RenderError> {
        ctx.check()?;
        let content = format!("XSL bytes: {}\nXML bytes: {}", xsl.len(), xml.len());
        Ok(build_simple_pdf(&content))
    }
}

/// Body sent to the sidecar
#[derive(Serialize)]
struct ForwardPayload<'a> {
    xsl: &'a str,
    xml: &'a str,
}

/// Renderer that forwards to a FOP sidecar over HTTP
#[derive(Debug, Clone)]
pub struct FopRenderer {
    /// Sidecar render URL (e.g. "http://fop:8090/render")
    endpoint: String,
    client: reqwest::Client,
}

impl FopRenderer {
    pub fn new(endpoint: &str) -> Result<Self, RenderError> {
        Self::with_timeout(endpoint, REMOTE_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RenderError::Client)?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn forward(&self, xsl: &str, xml: &str) -> Result<Vec<u8>, RenderError> {
        let payload =
            serde_json::to_vec(&ForwardPayload { xsl, xml }).map_err(RenderError::Encode)?;

        let request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/pdf")
            .body(payload)
            .build()
            .map_err(RenderError::BuildRequest)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(RenderError::Send)?;

        let status = response.status();
        let body = response.bytes().await.map_err(RenderError::ReadResponse)?;

        if !status.is_success() {
            return Err(RenderError::Remote {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        tracing::debug!("FOP sidecar returned {} bytes", body.len());
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Renderer for FopRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Remote
    }

    async fn render(
        &self,
        ctx: &RenderContext,
        xsl: &str,
        xml: &str,
    ) -> Result<Vec<u8>, RenderError> {
        ctx.run(self.forward(xsl, xml)).await
    }
}

/// Mock renderer for testing
#[cfg(test)]
pub struct MockRenderer {
    pub response: Result<Vec<u8>, String>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockRenderer {
    pub fn ok(pdf: &[u8]) -> Self {
        Self {
            response: Ok(pdf.to_vec()),
            calls: Default::default(),
        }
    }

    pub fn failing(output: &str) -> Self {
        Self {
            response: Err(output.to_string()),
            calls: Default::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl Renderer for MockRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Stub
    }

    async fn render(
        &self,
        ctx: &RenderContext,
        _xsl: &str,
        _xml: &str,
    ) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        ctx.check()?;
        self.response.clone().map_err(|message| RenderError::Remote {
            status: 500,
            message,
        })
    }
}
