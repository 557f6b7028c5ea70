//! POST /predict_presence

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

use birdcast_common::extract::extract_presence_features;
use birdcast_common::model::{FeatureRow, LOCALITY_FIELD, SPECIES_FIELD};

use super::{guidance, read_query};
use crate::error::{ApiError, ApiResult, Route};
use crate::AppState;

const ROUTE: Route = Route::Presence;

/// Will the species be at the locality on the resolved date and hour?
pub async fn predict_presence(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let query = read_query(&body)?;
    info!(route = ROUTE.as_str(), query = %query, "Received query");

    let fail = |e| {
        let err = ApiError::from_common(ROUTE, e);
        error!(route = ROUTE.as_str(), "{}", err);
        err
    };

    let features = extract_presence_features(&query, state.clock.as_ref()).map_err(fail)?;
    debug!(?features, "Extracted presence features");

    let Some(locality) = features.locality.known() else {
        warn!("Query has no recognizable locality");
        return Ok(guidance::presence_missing_locality());
    };
    let Some(bird) = features.bird_name.known() else {
        warn!("Query has no recognizable species");
        return Ok(guidance::missing_species(StatusCode::OK));
    };

    let bundle = &state.models.presence;
    let locality_code = bundle.label_encoders.encode(LOCALITY_FIELD, locality).map_err(fail)?;
    let bird_code = bundle.label_encoders.encode(SPECIES_FIELD, bird).map_err(fail)?;

    let row = FeatureRow::new(
        &bundle.selected_features,
        &[
            features.year as f64,
            features.month as f64,
            features.day_of_week as f64,
            features.hour as f64,
            locality_code,
            bird_code,
        ],
    )
    .map_err(fail)?;
    let probability = bundle.presence_probability(&row).map_err(fail)?;
    debug!(probability, "Presence probability");

    let likelihood = if probability >= 0.5 { "likely" } else { "unlikely" };
    let sentence = format!(
        "The {} is {} to be present at {} on {}, {}/{} in the {}.",
        bird,
        likelihood,
        locality,
        features.day_name,
        features.month,
        features.year,
        features.time_of_day
    );

    Ok(Json(json!({ "Response": sentence })).into_response())
}
