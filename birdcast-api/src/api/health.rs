//! Health check endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use birdcast_common::model::{BestTimeBundle, Bundle, LocationBundle, PresenceBundle};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub models: Vec<&'static str>,
}

/// GET /health
///
/// Bundles are loaded before the listener binds, so all three are listed.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "birdcast-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models: vec![PresenceBundle::NAME, LocationBundle::NAME, BestTimeBundle::NAME],
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
