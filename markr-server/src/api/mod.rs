//! HTTP API handlers for markr-server

pub mod health;
pub mod import;
pub mod results;

pub use health::health_routes;
pub use import::import_routes;
pub use results::results_routes;

use crate::error::ApiError;

/// GET /
pub async fn root() -> &'static str {
    "ok"
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
