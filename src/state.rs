//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::render::Renderer;

/// Shared application state
///
/// Built once at startup and cloned into every handler; nothing in it
/// changes while the server runs.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    renderer: Arc<dyn Renderer>,
    render_timeout: Option<Duration>,
}

impl AppState {
    /// Create a new application state around the chosen renderer
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                renderer,
                render_timeout: None,
            }),
        }
    }

    /// Create a state whose renders are bounded by `timeout`
    pub fn with_render_timeout(renderer: Arc<dyn Renderer>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                renderer,
                render_timeout: Some(timeout),
            }),
        }
    }

    /// Get the renderer
    pub fn renderer(&self) -> &dyn Renderer {
        self.inner.renderer.as_ref()
    }

    /// Deadline applied to each render, if any
    pub fn render_timeout(&self) -> Option<Duration> {
        self.inner.render_timeout
    }
}
