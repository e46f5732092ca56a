//! HTTP front end for contentflow.
//!
//! Exposes `GET /` as a liveness probe and `POST /api/generate`, which runs
//! one request through a [`ContentService`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use config::LogFormat;
use contentflow::service::{ContentRequest, ContentResponse, ContentService};
use error::ApiResult;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

/// Message returned by the liveness probe.
pub const SERVICE_NAME: &str = "Soul Content Generator API";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    service: ContentService,
}

impl AppState {
    /// Wraps a service for the router.
    #[must_use]
    pub fn new(service: ContentService) -> Self {
        Self { service }
    }
}

/// Builds the router with permissive CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/generate", post(generate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "message": SERVICE_NAME }))
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<Json<ContentResponse>> {
    let Json(request) = payload?;
    let response = state.service.generate(&request).await?;
    Ok(Json(response))
}

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
