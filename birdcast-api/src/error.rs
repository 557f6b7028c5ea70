//! Error types for birdcast-api
//!
//! Each prediction route reports failures with its own body and status:
//!
//! | Route | Status | Body |
//! |---|---|---|
//! | presence | 500 | `{"error": "Prediction error occurred"}` |
//! | location | 500 | `{"error": "Prediction error occurred: <detail>"}` |
//! | best time | 200 | `{"error": "Prediction error: <detail>", "status": "failure"}` |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Prediction route an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Presence,
    Location,
    BestTime,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Presence => "predict_presence",
            Route::Location => "predict_location",
            Route::BestTime => "predict_best_time",
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body had no usable `query` (400)
    #[error("No query provided")]
    NoQuery,

    /// Category outside the trained vocabulary (400)
    #[error("Invalid input detected: {0}")]
    InvalidInput(String),

    /// Anything else that went wrong while predicting
    #[error("Prediction error in {}: {detail}", .route.as_str())]
    Prediction { route: Route, detail: String },
}

impl ApiError {
    /// Classify a library error raised while serving `route`
    pub fn from_common(route: Route, err: birdcast_common::Error) -> Self {
        match err {
            birdcast_common::Error::UnseenLabel { .. } => ApiError::InvalidInput(err.to_string()),
            birdcast_common::Error::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Prediction {
                route,
                detail: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NoQuery => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No query provided" })),
            )
                .into_response(),
            ApiError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Invalid input detected: {}", msg) })),
            )
                .into_response(),
            ApiError::Prediction { route, detail } => match route {
                Route::Presence => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Prediction error occurred" })),
                )
                    .into_response(),
                Route::Location => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("Prediction error occurred: {}", detail) })),
                )
                    .into_response(),
                Route::BestTime => (
                    StatusCode::OK,
                    Json(json!({
                        "error": format!("Prediction error: {}", detail),
                        "status": "failure",
                    })),
                )
                    .into_response(),
            },
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_label_is_invalid_input() {
        let err = ApiError::from_common(
            Route::Presence,
            birdcast_common::Error::UnseenLabel {
                field: "LOCALITY".to_string(),
                value: "Kalametiya Bird Sanctuary".to_string(),
            },
        );
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_route_specific_statuses() {
        let status = |route| {
            ApiError::from_common(route, birdcast_common::Error::Model("boom".to_string()))
                .into_response()
                .status()
        };
        assert_eq!(status(Route::Presence), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(Route::Location), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(Route::BestTime), StatusCode::OK);
    }
}
