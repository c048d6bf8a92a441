use axum::http::{HeaderMap, header::AUTHORIZATION};

const BEARER_PREFIX: &str = "Bearer ";

/// Returns the token from `Authorization: Bearer <token>`.
///
/// A missing header, a non-UTF-8 value, any other scheme or an empty token
/// all yield `None`; none of them is an error.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}
