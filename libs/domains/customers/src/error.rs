use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, TokenError};
use database::mongodb::DuplicateKey;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::oauth::ProviderError;
use crate::repository::indexes;

#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    #[error("Duplicate value for unique index {:?}", .0.index)]
    Duplicate(DuplicateKey),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Customer {actor} may not modify customer {target}")]
    Forbidden { actor: Uuid, target: Uuid },

    #[error("OAuth provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Customer {0} already has a profile")]
    ProfileExists(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Failed to encode update: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),
}

pub type CustomerResult<T> = Result<T, CustomerError>;

impl CustomerError {
    /// Classify a driver error: unique index violations become `Duplicate`.
    pub fn from_write(err: mongodb::error::Error) -> Self {
        match database::mongodb::duplicate_key(&err) {
            Some(duplicate) => Self::Duplicate(duplicate),
            None => Self::Database(err),
        }
    }
}

fn duplicate_message(duplicate: &DuplicateKey) -> &'static str {
    match duplicate.index.as_deref() {
        Some(indexes::EMAIL) => "Email is already in use",
        Some(indexes::ORG_HANDLE) => "Organization handle is already taken",
        Some(indexes::PHONE) => "Phone number is already in use",
        Some(indexes::OAUTH_IDENTITY) => "OAuth identity is already linked to another customer",
        _ => "A customer with these details already exists",
    }
}

/// Convert CustomerError to AppError for standardized error responses
impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::NotFound(_) => AppError::not_found("Customer"),
            CustomerError::Duplicate(duplicate) => AppError::validation(duplicate_message(&duplicate)),
            CustomerError::Validation(errors) => AppError::from(errors),
            CustomerError::Unauthenticated => AppError::unauthenticated(),
            CustomerError::Forbidden { .. } => AppError::forbidden(),
            CustomerError::Provider(ProviderError::NotConfigured(kind)) => {
                AppError::validation(format!("OAuth provider '{kind}' is not enabled"))
            }
            CustomerError::Provider(err) => {
                tracing::warn!(error = %err, "OAuth provider exchange failed");
                AppError::Unauthorized("OAuth authentication failed".to_string())
            }
            CustomerError::Token(err) => AppError::Internal {
                message: "Failed to issue token".to_string(),
                source: Some(Box::new(err)),
            },
            CustomerError::ProfileExists(_) => {
                AppError::validation("Customer profile already exists; update it instead")
            }
            CustomerError::Database(err) => AppError::database(err),
            CustomerError::Encode(err) => AppError::database(err),
        }
    }
}

impl IntoResponse for CustomerError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
