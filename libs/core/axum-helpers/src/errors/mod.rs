//! Uniform error taxonomy for every HTTP-facing operation.
//!
//! Each [`AppError`] kind maps to exactly one [`ErrorCode`] and status. The
//! transport body is
//!
//! ```json
//! { "message": "Authentication required",
//!   "extensions": { "code": "UNAUTHORIZED", "statusCode": 401 } }
//! ```
//!
//! Validation failures add `extensions.details`; development builds add
//! `extensions.stacktrace` (see [`configure_exposure`]).

pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use core_config::Environment;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt::Display;
use std::sync::OnceLock;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type AppResult<T> = Result<T, AppError>;

static EXPOSURE: OnceLock<Environment> = OnceLock::new();

/// Fix the error exposure mode for the process. The first call wins.
///
/// Until this is called, responses omit stack traces.
pub fn configure_exposure(environment: Environment) {
    if EXPOSURE.set(environment).is_err() {
        tracing::debug!("Error exposure already configured, ignoring");
    }
}

fn exposes_stacktrace() -> bool {
    EXPOSURE.get().is_some_and(|env| env.is_development())
}

/// Wire format of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub extensions: ErrorExtensions,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    pub code: ErrorCode,
    pub status_code: u16,
    /// Field-level validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Error and its sources, outermost first. Development only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Database {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// `Unauthorized` with the default "Authentication required" message
    pub fn unauthenticated() -> Self {
        Self::Unauthorized(ErrorCode::Unauthorized.default_message().to_string())
    }

    /// `Forbidden` with the default message
    pub fn forbidden() -> Self {
        Self::Forbidden(ErrorCode::Forbidden.default_message().to_string())
    }

    /// `NotFound` with the message `"{resource} not found"`
    pub fn not_found(resource: impl Display) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    pub fn database(source: impl Into<BoxError>) -> Self {
        Self::Database {
            message: ErrorCode::DatabaseError.default_message().to_string(),
            source: Some(source.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Re-wrap an arbitrary failure into the taxonomy.
    ///
    /// An `AppError` passes through unchanged, anything carrying a validation
    /// failure in its source chain becomes `Validation`, and everything else
    /// becomes `Internal`.
    pub fn from_error(err: impl Into<BoxError>) -> Self {
        let err = match err.into().downcast::<AppError>() {
            Ok(app) => return *app,
            Err(other) => other,
        };

        if is_validation_error(&*err) {
            return Self::Validation {
                message: err.to_string(),
                details: validation_details(&*err),
            };
        }

        Self::Internal {
            message: ErrorCode::InternalServerError.default_message().to_string(),
            source: Some(err),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationError,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Database { .. } => ErrorCode::DatabaseError,
            Self::Internal { .. } => ErrorCode::InternalServerError,
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        self.code().status_code()
    }

    /// This error's message followed by each source's, outermost first.
    pub fn stacktrace(&self) -> Vec<String> {
        std::iter::successors(Some(self as &(dyn StdError + 'static)), |&e| e.source())
            .map(|e| e.to_string())
            .collect()
    }

    pub fn to_response_body(&self, expose_stacktrace: bool) -> ErrorResponse {
        let details = match self {
            Self::Validation { details, .. } => details.clone(),
            _ => None,
        };

        ErrorResponse {
            message: self.to_string(),
            extensions: ErrorExtensions {
                code: self.code(),
                status_code: self.status_code().as_u16(),
                details,
                stacktrace: expose_stacktrace.then(|| self.stacktrace()),
            },
        }
    }
}

/// True when a validator failure or a rejected JSON body appears anywhere in
/// the source chain. Purely structural: the error text is never inspected.
pub fn is_validation_error(err: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source()).any(|e| {
        e.is::<ValidationErrors>()
            || e.is::<JsonRejection>()
            || matches!(e.downcast_ref::<AppError>(), Some(AppError::Validation { .. }))
    })
}

fn validation_details(err: &(dyn StdError + 'static)) -> Option<serde_json::Value> {
    std::iter::successors(Some(err), |&e| e.source())
        .find_map(|e| e.downcast_ref::<ValidationErrors>())
        .and_then(|errors| serde_json::to_value(errors).ok())
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation {
            message: ErrorCode::ValidationError.default_message().to_string(),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = code.status_code();

        if code.is_server_error() {
            tracing::error!(
                code = %code,
                status_code = status.as_u16(),
                stacktrace = ?self.stacktrace(),
                message = %self
            );
        } else {
            tracing::info!(code = %code, status_code = status.as_u16(), message = %self);
        }

        let body = self.to_response_body(exposes_stacktrace());
        (status, Json(body)).into_response()
    }
}
