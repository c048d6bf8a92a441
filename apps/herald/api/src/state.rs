//! Shared application state.

use axum_helpers::TokenService;
use domain_announcements::MongoAnnouncementRepository;
use domain_customers::{MongoCustomerRepository, ProviderRegistry};
use mongodb::Client;
use std::sync::Arc;

/// Cloned into each router; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// MongoDB client (shares the underlying connection pool)
    pub mongo_client: Client,
    pub customers: Arc<MongoCustomerRepository>,
    pub announcements: Arc<MongoAnnouncementRepository>,
    pub tokens: TokenService,
    pub providers: ProviderRegistry,
}
