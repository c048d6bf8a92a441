//! Customers Domain
//!
//! Customer accounts, OAuth identity linking and the per-request identity
//! every mutation is authorized against.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ Handlers / AuthHandlers  │  ← HTTP endpoints
//! └────────────┬─────────────┘
//!              │  CurrentContext ◀── resolve_request_context (middleware)
//! ┌────────────▼─────────────┐
//! │ gate::require_authenticated
//! └────────────┬─────────────┘
//! ┌────────────▼─────────────┐
//! │ CustomerService /        │  ← validation, ownership,
//! │ IdentityLinkingService   │    find-or-create, token issue
//! └────────────┬─────────────┘
//! ┌────────────▼─────────────┐
//! │ CustomerRepository       │  ← MongoDB or in-memory
//! └──────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_customers::{
//!     ContextResolver, CustomerService, IdentityLinkingService, MongoCustomerRepository,
//!     ProviderRegistry, auth_handlers, handlers, resolve_request_context,
//! };
//!
//! let repository = Arc::new(MongoCustomerRepository::new(&db));
//! repository.init_indexes().await?;
//!
//! let resolver = Arc::new(ContextResolver::new(tokens.clone(), repository.clone()));
//! let api = Router::new()
//!     .nest("/customers", handlers::router(CustomerService::new(repository.clone())))
//!     .nest(
//!         "/auth",
//!         auth_handlers::auth_router(IdentityLinkingService::new(repository, providers, tokens)),
//!     )
//!     .layer(middleware::from_fn_with_state(
//!         resolver,
//!         resolve_request_context::<MongoCustomerRepository>,
//!     ));
//! ```

pub mod auth_handlers;
pub mod context;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod oauth;
pub mod repository;
pub mod service;

pub use auth_handlers::AuthApiDoc;
pub use context::{ContextResolver, CurrentContext, RequestContext, resolve_request_context};
pub use error::{CustomerError, CustomerResult};
pub use gate::require_authenticated;
pub use handlers::ApiDoc;
pub use models::{
    CreateCustomer, Customer, CustomerFilter, OAuthLink, OAuthProviderKind, UpdateCustomer,
    is_account_setup_complete,
};
pub use self::mongodb::MongoCustomerRepository;
pub use oauth::{
    AuthPayload, GithubProvider, GoogleProvider, IdentityLinkingService, IdentityProvider,
    OAuthConfig, OAuthCredentials, OAuthProfile, ProviderError, ProviderRegistry,
};
pub use repository::{CustomerRepository, InMemoryCustomerRepository};
pub use service::CustomerService;
