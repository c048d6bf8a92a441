//! Helpers that are not tied to a particular driver call

pub mod retry;

pub use retry::{RetryConfig, retry, retry_with_backoff};
