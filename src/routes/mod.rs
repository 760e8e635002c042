pub mod activity;
pub mod debug;
pub mod loop_route;

use axum::{routing::{get, post}, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/routes/loop", post(loop_route::create_loop_route))
        .route("/activities/tcx", post(activity::export_tcx))
        .route("/activities/gpx", post(activity::export_gpx))
        .route("/activities/telemetry", post(activity::telemetry))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}

/// Seeded RNG when the caller asks for reproducible output, OS entropy otherwise
fn request_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
