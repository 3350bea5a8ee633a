//! FOP Editor Server
//!
//! Public render API. Forwards XSL-FO + XML payloads to the FOP sidecar
//! named by `FOP_ENDPOINT`, or renders a placeholder PDF when it is unset.

use anyhow::Context;
use tokio::net::TcpListener;

use fopeditor_server::config::Config;
use fopeditor_server::render::renderer_for_endpoint;
use fopeditor_server::routes;
use fopeditor_server::server::{init_tracing, serve_with_drain, shutdown_signal, DRAIN_TIMEOUT};
use fopeditor_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    init_tracing("fopeditor_server=debug,tower_http=debug");

    let config = Config::from_env();
    tracing::info!("Starting FOP Editor Server v{}", env!("CARGO_PKG_VERSION"));

    let renderer = renderer_for_endpoint(config.renderer.fop_endpoint.as_deref())
        .context("failed to initialize renderer")?;
    let app = routes::api_router(AppState::new(renderer), config.server.max_body_bytes);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("HTTP server listening on {}", addr);

    serve_with_drain(listener, app, shutdown_signal(), DRAIN_TIMEOUT)
        .await
        .context("server exited")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
