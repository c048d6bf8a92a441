//! MongoDB connectivity shared by the Herald domain crates.
//!
//! # Features
//!
//! - `config` - load [`mongodb::MongoConfig`] through `core_config::FromEnv`
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "herald");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;
pub mod mongodb;

pub use common::{RetryConfig, retry, retry_with_backoff};
