//! OAuth sign-in: provider clients and the find-or-create linking flow.

pub mod linking;
pub mod providers;
pub mod types;

pub use linking::IdentityLinkingService;
pub use providers::{
    IdentityProvider, OAuthConfig, OAuthCredentials, ProviderError, ProviderRegistry,
    github::GithubProvider, google::GoogleProvider,
};
pub use types::{AuthPayload, CallbackParams, CodeExchangeRequest, OAuthProfile};
