use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Report the active provider and cache state
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {
            "provider": state.route_generator.provider_name(),
        }
    });

    match &state.graph_cache {
        Some(cache) => {
            status["checks"]["graph_cache"] = json!(cache.stats());
        }
        None => {
            status["checks"]["graph_cache"] = json!("disabled");
        }
    }

    Json(status)
}
