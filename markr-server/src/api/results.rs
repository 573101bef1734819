//! Result query endpoints
//!
//! GET /results/:test_id/aggregate, GET /results and the /delete reset.

use axum::{
    extract::{Path, State},
    routing::{any, get},
    Json, Router,
};
use markr_common::db::TestResult;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    aggregate::aggregate_results,
    error::{ApiError, ApiResult},
    AppState,
};

/// GET /results/:test_id/aggregate
///
/// Returns the summary statistics, or `{}` when the test has no results.
/// A test id that is not a plain decimal number is a 404.
pub async fn get_aggregate(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let test_id = parse_test_id(&test_id).ok_or(ApiError::NotFound)?;

    let body = match aggregate_results(&state.store, test_id).await? {
        Some(summary) => json!(summary),
        None => json!({}),
    };
    Ok(Json(body))
}

/// GET /results
pub async fn list_results(State(state): State<AppState>) -> ApiResult<Json<Vec<TestResult>>> {
    Ok(Json(state.store.list_results().await?))
}

/// /delete (any method)
///
/// Administrative reset: removes every result and student.
pub async fn delete_all(State(state): State<AppState>) -> ApiResult<&'static str> {
    state.store.delete_all().await?;
    info!("Deleted all results and students");
    Ok("ok")
}

fn parse_test_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Build result routes
pub fn results_routes() -> Router<AppState> {
    Router::new()
        .route("/results", get(list_results))
        .route("/results/:test_id/aggregate", get(get_aggregate))
        .route("/delete", any(delete_all))
}
