use axum::Router;
use domain_announcements::{AnnouncementService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(AnnouncementService::new(state.announcements.clone()))
}
