pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub use state::AppState;

/// Multipart framing on top of the raw upload limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/languages", get(routes::languages))
        .route("/api/extract", post(routes::extract))
        .route("/api/download", post(routes::download))
        .route("/api/engine/reset", post(routes::reset_engine))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
