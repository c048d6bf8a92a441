//! Readiness endpoint. Liveness (`/health`) comes from `axum_helpers::health_router`.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::{Client, check_health};
use serde_json::Value;

pub fn router(mongo_client: Client) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(mongo_client)
}

/// 200 when MongoDB answers a ping, 503 otherwise
async fn readiness_check(State(client): State<Client>) -> (StatusCode, Json<Value>) {
    let mongodb: HealthCheckFuture<'_> = Box::pin(check_health(&client));
    run_health_checks(vec![("mongodb", mongodb)]).await
}
