//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, stats_handler, value_handler, AppState, TextFetcher};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /values/:key` - Read a value through the cache
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<F: TextFetcher>(state: AppState<F>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/values/:key", get(value_handler::<F>))
        .route("/stats", get(stats_handler::<F>))
        .route("/health", get(health_handler::<F>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
