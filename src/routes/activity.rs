use super::request_rng;
use crate::error::{AppError, Result};
use crate::models::{ActivityRequest, ChartSeries};
use crate::services::activity_export::ExportFormat;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// POST /activities/tcx
/// Synthetic TCX activity for a route returned by /routes/loop
pub async fn export_tcx(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Result<Response> {
    export(&state, &request, ExportFormat::Tcx)
}

/// POST /activities/gpx
pub async fn export_gpx(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Result<Response> {
    export(&state, &request, ExportFormat::Gpx)
}

/// POST /activities/telemetry
/// Speed and heart-rate series for a client-side chart
pub async fn telemetry(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Result<Json<ChartSeries>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let mut rng = request_rng(request.seed);
    let series = state
        .exporter
        .chart_series(&request.path, &request.pace(), &mut rng);

    Ok(Json(series))
}

fn export(state: &AppState, request: &ActivityRequest, format: ExportFormat) -> Result<Response> {
    request.validate().map_err(AppError::InvalidRequest)?;

    tracing::info!(
        format = %format,
        activity = %request.activity,
        points = request.path.len(),
        avg_speed_kmh = request.avg_speed_kmh,
        avg_heart_rate_bpm = request.avg_heart_rate_bpm,
        "Activity export request"
    );

    let mut rng = request_rng(request.seed);
    let bytes = state.exporter.export(
        format,
        &request.path,
        &request.pace(),
        &request.metadata(),
        &mut rng,
    )?;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name(1));
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
