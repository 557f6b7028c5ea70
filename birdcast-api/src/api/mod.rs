//! HTTP API handlers for birdcast-api

pub mod best_time;
pub mod guidance;
pub mod health;
pub mod location;
pub mod presence;

pub use best_time::predict_best_time;
pub use health::health_routes;
pub use location::predict_location;
pub use presence::predict_presence;

use axum::body::Bytes;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Pull the `query` string out of a JSON request body
///
/// A body that is not JSON, lacks `query`, holds a non-string `query` or
/// only whitespace is treated as no query.
pub fn read_query(body: &Bytes) -> ApiResult<String> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::NoQuery)?;
    let query = value
        .get("query")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::NoQuery);
    }
    Ok(query.to_string())
}
