use axum::Router;
use domain_customers::{IdentityLinkingService, auth_handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let service = IdentityLinkingService::new(
        state.customers.clone(),
        state.providers.clone(),
        state.tokens.clone(),
    );
    auth_handlers::auth_router(service)
}
