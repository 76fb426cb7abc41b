use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use super::AppState;

/// GET /health: liveness plus catalog and cache counters.
pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "records": state.catalog.len(),
        "cache": state.catalog.cache_stats(),
    }))
}
