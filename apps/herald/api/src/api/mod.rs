//! API routes module
//!
//! Wires the domain crates to HTTP. Everything here is nested under `/api`
//! by `axum_helpers::create_router`.

pub mod announcements;
pub mod auth;
pub mod customers;
pub mod health;

use axum::{Router, middleware};
use domain_customers::{ContextResolver, MongoCustomerRepository, resolve_request_context};
use std::sync::Arc;

use crate::state::AppState;

/// Create all API routes.
///
/// Every route sees the resolved request context, so handlers can consult
/// the authorization gate without touching headers themselves.
pub fn routes(state: &AppState) -> Router {
    let resolver = Arc::new(ContextResolver::new(
        state.tokens.clone(),
        state.customers.clone(),
    ));

    Router::new()
        .nest("/auth", auth::router(state))
        .nest("/customers", customers::router(state))
        .nest("/announcements", announcements::router(state))
        .layer(middleware::from_fn_with_state(
            resolver,
            resolve_request_context::<MongoCustomerRepository>,
        ))
}
