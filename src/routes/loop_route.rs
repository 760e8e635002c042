use super::request_rng;
use crate::error::{AppError, Result};
use crate::models::{LoopRouteRequest, LoopRouteResponse};
use crate::services::route_generator::LoopSearch;
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// POST /routes/loop
/// Generate loop routes that start and end at the same point.
/// An empty result is still a 200 and carries a message.
pub async fn create_loop_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoopRouteRequest>,
) -> Result<Json<LoopRouteResponse>> {
    let config = state.route_generator.config();
    request
        .validate(config)
        .map_err(AppError::InvalidRequest)?;

    let search = LoopSearch::from_request(&request, config);

    tracing::info!(
        lat = request.start_point.lat,
        lng = request.start_point.lng,
        distance_km = request.distance_km,
        activity = %request.activity,
        count = search.count,
        tolerance_pct = search.tolerance_pct,
        "Loop route request: ({:.4}, {:.4}), {:.1}km, activity={}, count={}",
        request.start_point.lat, request.start_point.lng,
        request.distance_km, request.activity, search.count
    );

    let mut rng = request_rng(request.seed);
    let generation = state
        .route_generator
        .generate_loop_routes(&search, &mut rng)
        .await;

    Ok(Json(generation.into()))
}
