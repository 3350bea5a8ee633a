//! Render endpoint
//!
//! `POST` a JSON `{"xsl": ..., "xml": ...}` body and get `application/pdf`
//! back. Any other method gets 405 with `Allow: POST`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, MethodRouter},
};

use crate::error::{AppError, Result};
use crate::render::RenderContext;
use crate::request::RenderRequest;
use crate::state::AppState;

/// Render route, mounted at `/api/render` (public) or `/render` (sidecar)
pub fn method_router() -> MethodRouter<AppState> {
    post(render_pdf).fallback(method_not_allowed)
}

/// Validate the payload, render it and stream the PDF back
async fn render_pdf(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: RenderRequest = serde_json::from_slice(&body).map_err(AppError::InvalidJson)?;
    request.validate()?;

    let ctx = match state.render_timeout() {
        Some(timeout) => RenderContext::with_timeout(timeout),
        None => RenderContext::new(),
    };
    // Dropped with this future when the client goes away
    let _cancel_on_disconnect = ctx.cancel_on_drop();

    let pdf = state
        .renderer()
        .render(&ctx, &request.xsl, &request.xml)
        .await?;

    tracing::info!(
        "Rendered {} byte PDF with {:?} renderer",
        pdf.len(),
        state.renderer().kind()
    );

    Ok(pdf_response(pdf))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn pdf_response(pdf: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=render.pdf"),
        ],
        pdf,
    )
        .into_response()
}
