//! POST /predict_best_time

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

use birdcast_common::catalog::{is_valid_bird_name, is_valid_locality};
use birdcast_common::extract::extract_best_time_features;
use birdcast_common::model::{FeatureRow, LOCALITY_FIELD, SPECIES_FIELD};
use birdcast_common::time::month_name;

use super::{guidance, read_query};
use crate::error::{ApiError, ApiResult, Route};
use crate::AppState;

const ROUTE: Route = Route::BestTime;

/// When is the species most likely at the locality?
///
/// Month and hour come from two regressors sharing one input row.
pub async fn predict_best_time(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let query = read_query(&body)?;
    info!(route = ROUTE.as_str(), query = %query, "Received query");

    let features = extract_best_time_features(&query, state.clock.as_ref());
    debug!(?features, "Extracted best-time features");

    let Some(locality) = features.locality.known() else {
        warn!("Query has no recognizable locality");
        return Ok(guidance::best_time_missing_locality());
    };
    let Some(bird) = features.bird_name.known() else {
        warn!("Query has no recognizable species");
        return Ok(guidance::missing_species(StatusCode::BAD_REQUEST));
    };

    let bundle = &state.models.best_time;
    let encoded = check_vocabulary(locality, bird).and_then(|()| {
        let locality_code = bundle.label_encoders.encode(LOCALITY_FIELD, locality)?;
        let bird_code = bundle.label_encoders.encode(SPECIES_FIELD, bird)?;
        Ok((locality_code, bird_code))
    });
    let (locality_code, bird_code) = encoded.map_err(|e| {
        let err = ApiError::from_common(ROUTE, e);
        error!("Encoding error: {}", err);
        err
    })?;

    let fail = |e| {
        let err = ApiError::from_common(ROUTE, e);
        error!(route = ROUTE.as_str(), "{}", err);
        err
    };

    let mut values = vec![
        1.0,
        features.year as f64,
        features.day_of_week as f64,
        locality_code,
        bird_code,
    ];
    values.extend(features.seasons.as_row());
    values.extend(features.periods.as_row());
    let row = FeatureRow::new(&bundle.selected_features, &values).map_err(fail)?;

    let month = bundle.month_model.predict(row.values()).map_err(fail)?.round() as i64;
    let hour = bundle.hour_model.predict(row.values()).map_err(fail)?.round() as i64;
    debug!(month, hour, "Predicted best time");

    let (display_hour, meridiem) = twelve_hour(hour);
    let sentence = format!(
        "The {} can be seen at {} on a {}, at {}:00 {} in {}.",
        bird,
        locality,
        features.day_name,
        display_hour,
        meridiem,
        month_label(month)
    );

    Ok(Json(json!({ "Response": sentence })).into_response())
}

fn check_vocabulary(locality: &str, bird: &str) -> birdcast_common::Result<()> {
    if !is_valid_locality(locality) {
        return Err(birdcast_common::Error::InvalidInput(format!("Invalid locality: {}", locality)));
    }
    if !is_valid_bird_name(bird) {
        return Err(birdcast_common::Error::InvalidInput(format!("Invalid bird name: {}", bird)));
    }
    Ok(())
}

/// 12-hour display hour and meridiem; hours below 12 are a.m.
fn twelve_hour(hour: i64) -> (i64, &'static str) {
    let meridiem = if hour < 12 { "a.m." } else { "p.m." };
    let display = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    (display, meridiem)
}

fn month_label(month: i64) -> String {
    u32::try_from(month)
        .ok()
        .and_then(month_name)
        .map(String::from)
        .unwrap_or_else(|| format!("Unknown ({})", month))
}
