//! Bearer-token authentication.
//!
//! - [`TokenService`] issues and verifies signed, time-limited tokens
//! - [`JwtConfig`] carries the signing secret and lifetime, loaded at startup
//! - [`extract_bearer_token`] reads `Authorization: Bearer <token>`
//!
//! ```ignore
//! use axum_helpers::auth::{JwtConfig, TokenService};
//! use core_config::FromEnv;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env()?);
//! let issued = tokens.issue(&customer_id)?;
//! assert_eq!(tokens.verify(&issued.token)?.customer_id, customer_id);
//! ```

pub mod bearer;
pub mod config;
pub mod jwt;

pub use bearer::extract_bearer_token;
pub use config::{JwtConfig, parse_expires_in};
pub use jwt::{Claims, IssuedToken, TokenError, TokenService, VerifiedToken};
