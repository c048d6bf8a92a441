use axum_helpers::TokenService;
use axum_helpers::errors::configure_exposure;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_announcements::MongoAnnouncementRepository;
use domain_customers::{MongoCustomerRepository, ProviderRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    // Fails fast on a missing secret or provider credentials
    let config = Config::from_env()?;

    init_tracing(&config.environment);
    configure_exposure(config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());
    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    let customers = Arc::new(MongoCustomerRepository::new(&db));
    customers.init_indexes().await?;
    let announcements = Arc::new(MongoAnnouncementRepository::new(&db));
    announcements.init_indexes().await?;

    let providers = ProviderRegistry::from_config(&config.oauth, &config.server.public_url)?;
    info!(providers = ?providers.enabled(), "OAuth providers configured");

    let state = AppState {
        tokens: TokenService::new(&config.jwt),
        config,
        mongo_client,
        customers,
        announcements,
        providers,
    };

    let api_routes = api::routes(&state);
    let app = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)
        .merge(health_router(state.config.app.clone()))
        .merge(api::health::router(state.mongo_client.clone()));

    info!("Starting Herald API with graceful shutdown (30s timeout)");

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Herald API shutdown complete");
    Ok(())
}
