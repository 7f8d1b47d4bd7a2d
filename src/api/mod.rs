use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::geocoding::Geocoder;
use crate::location_resolver::reverse_geocode;
use crate::models::{Coordinates, Location, SearchCandidate};

#[derive(Clone)]
pub struct ApiState {
    pub geocoder: Arc<dyn Geocoder>,
    pub precision: u32,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiError {
    pub error: String,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/locations/search", get(search_locations))
        .route("/locations/reverse", get(reverse_location))
        .with_state(state)
}

async fn search_locations(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<SearchCandidate>> {
    match state.geocoder.search(&params.q).await {
        Ok(candidates) => Json(candidates),
        Err(e) => {
            tracing::warn!("Location search for '{}' failed: {}", params.q, e);
            Json(Vec::new())
        }
    }
}

async fn reverse_location(
    State(state): State<ApiState>,
    Query(params): Query<ReverseParams>,
) -> Result<Json<Location>, (StatusCode, Json<ApiError>)> {
    let coordinates = Coordinates::new(params.lat, params.lon, state.precision).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: e.to_string(),
            }),
        )
    })?;

    let label = reverse_geocode(state.geocoder.as_ref(), coordinates)
        .await
        .unwrap_or_default();
    Ok(Json(Location::at(coordinates, label)))
}
