//! # Axum Helpers
//!
//! Shared HTTP plumbing for Herald services.
//!
//! - **[`errors`]**: the error taxonomy (`AppError`, `ErrorCode`) and its wire format
//! - **[`auth`]**: bearer-token issuance and verification
//! - **[`server`]**: router assembly, health endpoints, graceful shutdown
//! - **[`http`]**: security headers middleware
//! - **[`extractors`]**: `UuidPath`

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{IssuedToken, JwtConfig, TokenError, TokenService, VerifiedToken, extract_bearer_token};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::security_headers;

pub use errors::{AppError, AppResult, ErrorCode, ErrorResponse, is_validation_error};

pub use extractors::UuidPath;
