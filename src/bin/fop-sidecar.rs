//! FOP Sidecar
//!
//! Wraps the Apache FOP command line behind `POST /render`. Each request
//! gets its own working directory and at most 60 seconds of FOP time.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use fopeditor_server::config::SidecarConfig;
use fopeditor_server::render::{FopCommandRenderer, MAX_RUN_TIME};
use fopeditor_server::routes;
use fopeditor_server::server::{init_tracing, serve_with_drain, shutdown_signal, DRAIN_TIMEOUT};
use fopeditor_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing("fop_sidecar=debug,fopeditor_server=debug,tower_http=debug");

    let config = SidecarConfig::from_env();
    tracing::info!("Starting FOP sidecar v{}", env!("CARGO_PKG_VERSION"));

    let renderer = FopCommandRenderer::new(config.fop.clone());
    if !renderer.is_available().await {
        tracing::warn!(
            "{} did not answer -version; renders will fail until it is installed",
            config.fop.fop_path
        );
    }

    let state = AppState::with_render_timeout(Arc::new(renderer), MAX_RUN_TIME);
    let app = routes::sidecar_router(state, config.server.max_body_bytes);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("FOP sidecar listening on {}", addr);

    serve_with_drain(listener, app, shutdown_signal(), DRAIN_TIMEOUT)
        .await
        .context("server exited")?;

    tracing::info!("Sidecar shutdown complete");
    Ok(())
}
