use axum::Router;
use domain_customers::{CustomerService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(CustomerService::new(state.customers.clone()))
}
