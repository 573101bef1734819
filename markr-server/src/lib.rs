//! markr-server library - test results ingest and aggregate service
//!
//! Exposes the router and pipeline stages for the binary and integration tests.

use axum::Router;
use markr_common::db::ResultStore;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod document;
pub mod error;
pub mod import;
pub mod validate;

pub use crate::error::{ApiError, ApiResult, ImportError};

use crate::import::Importer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Students/results store
    pub store: ResultStore,
    /// Best-score-wins importer over the same store
    pub importer: Importer,
}

impl AppState {
    pub fn new(store: ResultStore) -> Self {
        Self {
            importer: Importer::new(store.clone()),
            store,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::root))
        .merge(api::health_routes())
        .merge(api::import_routes())
        .merge(api::results_routes())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
