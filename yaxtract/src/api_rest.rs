//! REST endpoints for audio extraction
//!
//! Defines the HTTP handlers: health check, the POST extraction endpoint
//! (stream or JSON fallback) and its GET streaming-only variant.

use crate::chain::ResolverChain;
use crate::error::Error;
use crate::models::ExtractRequest;
use crate::relay;
use crate::validate::validate_watch_url;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Service identifier reported by the health endpoint
pub const SERVICE_NAME: &str = "yaxtract";

/// Shared state for the extraction handlers
///
/// Cheap to clone; the HTTP client keeps its connection pool behind an
/// Arc internally.
#[derive(Clone)]
pub struct ExtractState {
    pub chain: Arc<ResolverChain>,
    pub http: reqwest::Client,
}

impl ExtractState {
    pub fn new(chain: Arc<ResolverChain>) -> Self {
        Self {
            chain,
            http: relay::relay_client(
                relay::DEFAULT_CONNECT_TIMEOUT,
                relay::DEFAULT_READ_TIMEOUT,
            ),
        }
    }

    /// Uses a custom relay client (shared pools, proxies, test doubles)
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

// ============ Error handling ============

fn error_response(err: Error) -> Response {
    match err {
        Error::InvalidUrl(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        Error::AllBackendsFailed { backend, message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to extract audio",
                "details": format!("{backend}: {message}"),
            })),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

fn missing_url_response(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Creates the router for the extraction API
pub fn create_router(state: ExtractState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/extract-audio",
            get(extract_audio_direct).post(extract_audio),
        )
        .with_state(state)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health
/// Fixed shape, independent of backend configuration
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// POST /extract-audio
/// Resolves the URL through the chain, then streams the audio or falls
/// back to the JSON download payload.
async fn extract_audio(
    State(state): State<ExtractState>,
    Json(request): Json<ExtractRequest>,
) -> Response {
    if request.url.trim().is_empty() {
        return missing_url_response("URL is required");
    }

    if let Err(err) = validate_watch_url(&request.url) {
        return error_response(err);
    }

    info!(url = %request.url, "Extracting audio");

    match state.chain.resolve(&request.url).await {
        Ok(locator) => relay::relay(&state.http, &request.url, locator).await,
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    url: Option<String>,
}

/// GET /extract-audio?url=...
/// Streaming-only variant: remote-URL locators redirect, open streams
/// are forwarded. No JSON fallback.
async fn extract_audio_direct(
    State(state): State<ExtractState>,
    Query(query): Query<ExtractQuery>,
) -> Response {
    let url = match query.url {
        Some(u) if !u.trim().is_empty() => u,
        _ => return missing_url_response("URL query parameter is required"),
    };

    if let Err(err) = validate_watch_url(&url) {
        return error_response(err);
    }

    match state.chain.resolve(&url).await {
        Ok(locator) => relay::relay_streaming_only(locator),
        Err(err) => error_response(err),
    }
}
