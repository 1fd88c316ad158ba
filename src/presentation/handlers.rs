// HTTP request handlers
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LiveQuery {
    pub crop: Option<String>,
}

#[derive(Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Check if client accepts Brotli compression
fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

fn into_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List selectable counties
pub async fn list_regions(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);

    match state.region_service.list_counties().await {
        Ok(counties) => into_response(json_response(&counties, compress).await),
        Err(e) => {
            tracing::error!("Error fetching counties: {:#}", e);
            // Return empty list on error
            into_response(json_response(&Vec::<()>::new(), compress).await)
        }
    }
}

/// Resolve a map click to the nearest county
pub async fn nearest_region(
    Query(query): Query<NearestQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    if !query.lat.is_finite() || !query.lng.is_finite() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match state.region_service.nearest_county(query.lat, query.lng).await {
        Ok(Some(county)) => into_response(json_response(&county, accepts_brotli(&headers)).await),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!("Error locating county: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Stream live windows for a county until the client disconnects
pub async fn stream_region(
    Path(fips): Path<String>,
    Query(query): Query<LiveQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let crop = query.crop.unwrap_or_else(|| state.default_crop.clone());
    let compress = accepts_brotli(&headers);

    match state.live_service.stream_region(&fips, &crop).await {
        Ok(Some(rx)) => stream_from_receiver(rx, compress).await.into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!("Error opening live stream for {}: {:#}", fips, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
