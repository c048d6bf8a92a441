//! UUID path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// A `{id}` path segment parsed as a UUID. A malformed id is rejected as a
/// `VALIDATION_ERROR` in the standard error shape.
///
/// ```ignore
/// async fn get_customer(UuidPath(id): UuidPath) -> String {
///     format!("Customer ID: {id}")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        Uuid::parse_str(&raw)
            .map(UuidPath)
            .map_err(|_| AppError::validation(format!("Invalid id: {raw}")))
    }
}
