//! Result import endpoint
//!
//! POST /import accepts a `text/xml+markr` document of scanned results. The
//! batch is parsed and validated in full before anything is written.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use tracing::{info, warn};

use crate::{
    document::parse_document,
    error::{ApiError, ApiResult},
    validate::validate_document,
    AppState,
};

/// Media type accepted by POST /import
pub const MARKR_CONTENT_TYPE: &str = "text/xml+markr";

/// POST /import
///
/// Returns 201 Created with an empty body once every record has been merged.
pub async fn import_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<StatusCode> {
    if !is_markr_content(&headers) {
        return Err(ApiError::NotAcceptable);
    }

    let records = parse_document(&body)
        .and_then(|document| validate_document(&document))
        .map_err(|e| {
            warn!(error = %e, "Rejected import batch");
            e
        })?;

    info!(records = records.len(), "Importing result batch");
    state.importer.import(&records).await?;

    Ok(StatusCode::CREATED)
}

/// Any other method on /import
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
    )
}

fn is_markr_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(MARKR_CONTENT_TYPE))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import", post(import_results).fallback(method_not_allowed))
}
