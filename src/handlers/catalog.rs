use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use srvcat::filters::RawQuery;

use super::AppState;

/// GET /api/servers: filtered, sorted, paginated listings.
///
/// Accepts repeated or comma-separated list parameters (`ram=16GB&ram=32GB`,
/// `storage[]=1TB-2TB`). Invalid values are ignored rather than rejected.
pub async fn servers_list(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let raw = RawQuery::from_pairs(params);
    let (_, result) = state.catalog.search(&raw);
    Json(result.as_ref().clone())
}

/// GET /api/servers/:id: a single listing.
pub async fn server_detail(State(state): State<AppState>, Path(id): Path<u64>) -> impl IntoResponse {
    match state.catalog.find_by_id(id) {
        Some(record) => Json(record).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({"error": "not found"}))).into_response(),
    }
}

/// GET /api/filters: option lists for filter controls.
pub async fn filters_get(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.filter_options())
}
