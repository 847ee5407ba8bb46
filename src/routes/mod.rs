pub mod health;
pub mod reports;

use axum::Router;
use axum::routing::{get, post};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::AppState;
use crate::telemetry::{HttpMakeSpan, HttpOnResponse};

/// Report endpoints, the health probe, and the static front-end as fallback.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.public_dir);

    Router::new()
        .route("/api/health", get(health::health))
        .route("/search-companies", post(reports::search_companies))
        .route(
            "/download-report/{filename}",
            get(reports::download_report),
        )
        .fallback_service(static_files)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(HttpMakeSpan)
                .on_response(HttpOnResponse),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
