use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AnnouncementError {
    #[error("Announcement not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Customer {actor} may not act on announcements of customer {owner}")]
    Forbidden { actor: Uuid, owner: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type AnnouncementResult<T> = Result<T, AnnouncementError>;

/// Convert AnnouncementError to AppError for standardized error responses
impl From<AnnouncementError> for AppError {
    fn from(err: AnnouncementError) -> Self {
        match err {
            AnnouncementError::NotFound(_) => AppError::not_found("Announcement"),
            AnnouncementError::Validation(errors) => AppError::from(errors),
            AnnouncementError::Forbidden { .. } => AppError::forbidden(),
            AnnouncementError::Database(err) => AppError::database(err),
        }
    }
}

impl IntoResponse for AnnouncementError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
