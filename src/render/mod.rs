//! Render Module
//!
//! Turns an XSL-FO stylesheet plus XML data into PDF bytes.
//!
//! Backends:
//! - Stub (placeholder PDF, used when no sidecar is configured)
//! - FOP sidecar over HTTP
//! - Local `fop` subprocess (used by the sidecar itself)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fopeditor_server::render::{renderer_for_endpoint, RenderContext};
//!
//! let renderer = renderer_for_endpoint(std::env::var("FOP_ENDPOINT").ok().as_deref())?;
//! let ctx = RenderContext::with_timeout(Duration::from_secs(60));
//! let pdf = renderer.render(&ctx, &xsl, &xml).await?;
//! ```

mod command;
mod provider;
mod types;

use std::sync::Arc;

pub use command::{FopCommandConfig, FopCommandRenderer, MAX_RUN_TIME};
pub use provider::{FopRenderer, Renderer, StubRenderer, REMOTE_TIMEOUT};
pub use types::{RenderContext, RenderError, RendererKind};

#[cfg(test)]
pub(crate) use provider::MockRenderer;

/// Pick the public tier's renderer
///
/// A non-empty endpoint selects the FOP sidecar, anything else falls back
/// to the stub.
pub fn renderer_for_endpoint(endpoint: Option<&str>) -> Result<Arc<dyn Renderer>, RenderError> {
    match endpoint.map(str::trim).filter(|e| !e.is_empty()) {
        Some(endpoint) => {
            tracing::info!("Using FOP endpoint {}", endpoint);
            Ok(Arc::new(FopRenderer::new(endpoint)?))
        }
        None => {
            tracing::warn!("FOP_ENDPOINT not set, falling back to stub renderer");
            Ok(Arc::new(StubRenderer::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renderer_selection() {
        assert_eq!(renderer_for_endpoint(None).unwrap().kind(), RendererKind::Stub);
        assert_eq!(renderer_for_endpoint(Some("  ")).unwrap().kind(), RendererKind::Stub);
        assert_eq!(
            renderer_for_endpoint(Some("http://fop:8090/render"))
                .unwrap()
                .kind(),
            RendererKind::Remote
        );
    }
}
