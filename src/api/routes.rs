//! API Routes
//!
//! Configures the Axum router with all conversion service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, health_handler, stats_handler, tex2typst_handler, typst2tex_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /convert/tex2typst` - Convert TeX to Typst
/// - `POST /convert/typst2tex` - Convert Typst to TeX
/// - `GET /stats` - Per-direction cache statistics
/// - `DELETE /cache` - Clear both caches
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/convert/tex2typst", post(tex2typst_handler))
        .route("/convert/typst2tex", post(typst2tex_handler))
        .route("/stats", get(stats_handler))
        .route("/cache", delete(clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
