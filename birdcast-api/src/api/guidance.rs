//! Guidance payloads for queries missing a locality or species
//!
//! Returned instead of a prediction; the model is never invoked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use birdcast_common::catalog::{LOCATION_HINTS, VALID_BIRD_NAMES, VALID_LOCALITIES};

pub const MISSING_DISTRICT_LOCATION: &str =
    "The query you entered didn't contain a location in Hambanthota District. Please select one and re-enter the query.";
pub const MISSING_LOCATION: &str =
    "The query you entered didn't contain a location. Please select one.";
pub const MISSING_SPECIES: &str =
    "The query you entered didn't contain a bird species. Please select one and re-enter the query.";

/// Presence route, no locality (200)
pub fn presence_missing_locality() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "message": MISSING_DISTRICT_LOCATION,
            "you can use these locations": LOCATION_HINTS,
        })),
    )
        .into_response()
}

/// Best-time route, no locality (400)
pub fn best_time_missing_locality() -> Response {
    let mut aliases = LOCATION_HINTS.map(String::from);
    aliases[0] = aliases[0].replacen("You can use", "You can also use", 1);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "message": MISSING_LOCATION,
            "valid_localities": VALID_LOCALITIES,
            "location_aliases": aliases,
        })),
    )
        .into_response()
}

/// Any route, no species
pub fn missing_species(status: StatusCode) -> Response {
    (
        status,
        Json(json!({
            "message": MISSING_SPECIES,
            "valid_bird_names": VALID_BIRD_NAMES,
        })),
    )
        .into_response()
}
