//! MongoDB connector and utilities
//!
//! Connection management, health probing and helpers for interpreting
//! driver errors (duplicate keys in particular).

mod config;
mod connector;
mod errors;
mod health;
pub mod uuid_as_string;

pub use config::MongoConfig;
pub use connector::{MongoError, connect, connect_from_config, connect_from_config_with_retry};
pub use errors::{DUPLICATE_KEY_CODE, DuplicateKey, duplicate_key};
pub use health::{check_health, ping};

pub use mongodb::{Client, Collection, Database};
