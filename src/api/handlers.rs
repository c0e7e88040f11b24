//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::RefreshingCache;
use crate::error::Result;
use crate::fetcher::ValueFetcher;
use crate::models::{HealthResponse, StatsResponse, ValueResponse};

/// Fetchers the HTTP front can serve: keyed by a path segment, producing text.
pub trait TextFetcher: ValueFetcher<Args = str, Value = String> + 'static {}

impl<F> TextFetcher for F where F: ValueFetcher<Args = str, Value = String> + 'static {}

/// Application state shared across all handlers.
pub struct AppState<F: TextFetcher> {
    /// Shared refreshing cache
    pub cache: Arc<RefreshingCache<F>>,
}

impl<F: TextFetcher> AppState<F> {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: RefreshingCache<F>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }
}

impl<F: TextFetcher> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

/// Handler for GET /values/:key
///
/// Reads the key through the cache, refreshing it from the fetcher when needed.
pub async fn value_handler<F: TextFetcher>(
    State(state): State<AppState<F>>,
    Path(key): Path<String>,
) -> Result<Json<ValueResponse>> {
    let lookup = state.cache.get_value(key.as_str()).await?;

    Ok(Json(ValueResponse::from_lookup(key, lookup)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler<F: TextFetcher>(State(state): State<AppState<F>>) -> Json<StatsResponse> {
    let total_entries = state.cache.len().await;

    Json(StatsResponse::new(state.cache.stats(), total_entries))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler<F: TextFetcher>(State(state): State<AppState<F>>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.reaper_state()))
}
