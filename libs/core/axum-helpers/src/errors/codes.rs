//! Stable, machine-readable error codes.
//!
//! `ErrorCode` is the single source of truth for the code string a client
//! sees, the HTTP status that goes with it and the default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::Unauthorized;
//! assert_eq!(code.as_str(), "UNAUTHORIZED");
//! assert_eq!(code.status_code().as_u16(), 401);
//! assert_eq!(code.default_message(), "Authentication required");
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input failed schema or business constraints
    ValidationError,
    /// No identity, or an invalid one, where one is required
    Unauthorized,
    /// Identity present but not allowed to perform the operation
    Forbidden,
    /// Referenced entity does not exist
    NotFound,
    /// The document store failed unexpectedly
    DatabaseError,
    /// Anything not classified above
    InternalServerError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::DatabaseError | Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Validation failed",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Not authorized to perform this action",
            Self::NotFound => "Resource not found",
            Self::DatabaseError => "Database operation failed",
            Self::InternalServerError => "Internal server error",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
