//! POST /predict_location

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

use birdcast_common::catalog::SURVEY_POINTS;
use birdcast_common::extract::extract_location_features;
use birdcast_common::model::{FeatureRow, LOCALITY_FIELD, SPECIES_FIELD};

use super::{guidance, read_query};
use crate::error::{ApiError, ApiResult, Route};
use crate::AppState;

const ROUTE: Route = Route::Location;

/// Where can the species be seen on the resolved date and hour?
///
/// The location model is probed once per survey point; the predicted
/// localities are reported once each, in the order first predicted.
pub async fn predict_location(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let query = read_query(&body)?;
    info!(route = ROUTE.as_str(), query = %query, "Received query");

    let fail = |e| {
        let err = ApiError::from_common(ROUTE, e);
        error!(route = ROUTE.as_str(), "{}", err);
        err
    };

    let features = extract_location_features(&query, state.clock.as_ref()).map_err(fail)?;
    debug!(?features, "Extracted location features");

    let Some(bird) = features.bird_name.known() else {
        warn!("Query has no recognizable species");
        return Ok(guidance::missing_species(StatusCode::OK));
    };

    let bundle = &state.models.location;
    let bird_code = bundle.label_encoders.encode(SPECIES_FIELD, bird).map_err(fail)?;

    let mut localities: Vec<&str> = Vec::new();
    for point in &SURVEY_POINTS {
        let row = FeatureRow::new(
            &bundle.selected_features,
            &[
                features.year as f64,
                features.month as f64,
                features.day_of_week as f64,
                features.hour as f64,
                point.latitude,
                point.longitude,
                bird_code,
            ],
        )
        .map_err(fail)?;
        let code = bundle.location_model.predict(row.values()).map_err(fail)?;
        let locality = bundle.label_encoders.decode(LOCALITY_FIELD, code).map_err(fail)?;
        if !localities.contains(&locality) {
            localities.push(locality);
        }
    }
    debug!(?localities, "Predicted localities");

    let sentence = format!(
        "The {} can be seen on {}, {}/{} in the {} at these locations in Hambanthota District: {}.",
        bird,
        features.day_name,
        features.month,
        features.year,
        features.time_of_day,
        localities.join(", ")
    );

    Ok(Json(json!({ "Response for you": sentence })).into_response())
}
