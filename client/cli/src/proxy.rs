//! Local proxy for browser clients.
//!
//! Hosts the compact processing route the web dashboard calls, forwarding
//! to the hosted backend with the configured credentials.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use uuid::Uuid;

use studylens_api::{ApiClient, CompactProcessResponse};
use studylens_core::types::ImageUploadRequest;
use studylens_core::{ImagePayload, LensError, ProcessingOutcome};

/// Shared state for proxy handlers.
pub struct AppState {
    pub client: ApiClient,
}

/// Build the proxy router.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/process", post(process))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Serve the proxy until the process is stopped.
pub async fn serve(
    client: ApiClient,
    bind_address: &str,
    port: u16,
    max_image_bytes: u64,
) -> Result<()> {
    let state = Arc::new(AppState { client });
    // Base64 expands the image by a third; leave room for that plus the
    // JSON wrapper.
    let max_body = (max_image_bytes as usize).saturating_mul(2);
    let app = build_router(state, max_body).layer(CorsLayer::permissive());

    let addr = format!("{bind_address}:{port}");
    info!(addr = %addr, "Local proxy listening");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "studylens-proxy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Forward a processing request upstream and answer in the compact shape.
async fn process(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImageUploadRequest>,
) -> (StatusCode, Json<CompactProcessResponse>) {
    let request_id = Uuid::new_v4();
    // Browser file readers produce data URIs; the backend wants bare base64.
    let request = ImageUploadRequest {
        image_data: ImagePayload::from_data_uri(request.image_data.as_str()),
        ..request
    };
    info!(%request_id, bytes = request.image_data.len(), "Proxying processing request");

    match state.client.process_image(&request).await {
        Ok(envelope) => {
            let outcome = ProcessingOutcome::from(envelope);
            (StatusCode::OK, Json(CompactProcessResponse::from(outcome)))
        }
        Err(e) => {
            error!(%request_id, error = %e, "Upstream processing call failed");
            (
                upstream_status(&e),
                Json(CompactProcessResponse {
                    success: false,
                    data: None,
                    error: Some(e.user_message()),
                }),
            )
        }
    }
}

/// Forward the upstream failure status when there is one; everything else
/// is a bad gateway.
fn upstream_status(error: &LensError) -> StatusCode {
    match error {
        LensError::Transport { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}
