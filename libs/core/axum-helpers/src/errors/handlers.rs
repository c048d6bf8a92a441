use axum::response::{IntoResponse, Response};

use super::AppError;

/// Fallback for unmatched routes, rendered in the standard error shape.
pub async fn not_found() -> Response {
    AppError::not_found("Route").into_response()
}
