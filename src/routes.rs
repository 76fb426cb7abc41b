use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::system::health_get))
        .route("/api/servers", get(handlers::catalog::servers_list))
        .route("/api/servers/:id", get(handlers::catalog::server_detail))
        .route("/api/filters", get(handlers::catalog::filters_get))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
