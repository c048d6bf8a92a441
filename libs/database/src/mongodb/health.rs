use mongodb::{Client, bson::doc};
use std::time::{Duration, Instant};

/// Round-trip a `ping` to the server and return the latency.
pub async fn ping(client: &Client) -> Result<Duration, mongodb::error::Error> {
    let start = Instant::now();
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(start.elapsed())
}

/// Readiness probe: `Err` carries the reason for the logs.
pub async fn check_health(client: &Client) -> Result<(), String> {
    match ping(client).await {
        Ok(latency) => {
            tracing::trace!(latency_ms = latency.as_millis() as u64, "MongoDB ping");
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}
