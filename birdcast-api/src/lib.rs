//! birdcast-api library - sighting prediction service
//!
//! Three POST routes turn a free-text question into a model prediction:
//! `/predict_presence`, `/predict_location` and `/predict_best_time`.

use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use birdcast_common::model::{BestTimeBundle, LocationBundle, PresenceBundle};
use birdcast_common::{Clock, SystemClock};

pub mod api;
pub mod error;
pub mod model_store;

/// The three loaded model bundles
#[derive(Debug)]
pub struct Models {
    pub presence: PresenceBundle,
    pub location: LocationBundle,
    pub best_time: BestTimeBundle,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Immutable after startup
    pub models: Arc<Models>,
    /// Source of "today" for date resolution
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State backed by the wall clock
    pub fn new(models: Models) -> Self {
        Self::with_clock(models, Arc::new(SystemClock))
    }

    pub fn with_clock(models: Models, clock: Arc<dyn Clock>) -> Self {
        Self {
            models: Arc::new(models),
            clock,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict_presence", post(api::predict_presence))
        .route("/predict_location", post(api::predict_location))
        .route("/predict_best_time", post(api::predict_best_time))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
