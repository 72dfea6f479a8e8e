use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::catalog::CatalogError;
use crate::shopping::SelectionError;

/// Request-level failures. Structurally malformed bodies never get here: the
/// JSON extractor rejects them with a 4xx before a handler runs.
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    Selection(SelectionError),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self { ApiError::Catalog(err) }
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self { ApiError::Selection(err) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Catalog(err) => {
                tracing::error!(error = %err, "catalog unavailable");
                let body = json!({
                    "error": "catalog_unavailable",
                    "message": err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::Selection(err) => {
                tracing::debug!(error = %err, "rejected selection");
                let body = json!({
                    "error": "invalid_selection",
                    "message": err.to_string(),
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}
