pub mod github;
pub mod google;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_required};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::models::OAuthProviderKind;
use crate::oauth::types::OAuthProfile;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OAuth provider '{0}' is not configured")]
    NotConfigured(OAuthProviderKind),

    #[error("Invalid OAuth client configuration: {0}")]
    Configuration(String),

    #[error("Authorization code exchange failed: {0}")]
    Exchange(String),

    #[error("Failed to fetch profile: {0}")]
    Profile(String),
}

/// An external identity provider: builds the consent redirect and turns an
/// authorization code into a verified profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn kind(&self) -> OAuthProviderKind;

    /// URL of the provider's consent page, carrying `state` back to the callback
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange a one-time code and fetch the profile it grants access to.
    /// Failures are final; the code cannot be replayed.
    async fn exchange_code_for_profile(&self, code: &str) -> Result<OAuthProfile, ProviderError>;
}

/// Client id and secret issued by a provider
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Provider credentials. GitHub is required, Google is enabled only when
/// both of its variables are set.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub github: OAuthCredentials,
    pub google: Option<OAuthCredentials>,
}

impl FromEnv for OAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let github = OAuthCredentials::new(
            env_required("GITHUB_CLIENT_ID")?,
            env_required("GITHUB_CLIENT_SECRET")?,
        );

        let google = match (
            env_optional("GOOGLE_CLIENT_ID"),
            env_optional("GOOGLE_CLIENT_SECRET"),
        ) {
            (Some(id), Some(secret)) => Some(OAuthCredentials::new(id, secret)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("GOOGLE_CLIENT_SECRET".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("GOOGLE_CLIENT_ID".into())),
        };

        Ok(Self { github, google })
    }
}

/// Fixed endpoints and scopes of a provider's authorization server
#[derive(Debug, Clone, Copy)]
pub struct OAuthEndpoints {
    pub auth_url: &'static str,
    pub token_url: &'static str,
    pub scopes: &'static [&'static str],
}

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Authorization-code client shared by the concrete providers.
#[derive(Clone)]
pub struct OAuthClient {
    client: ConfiguredClient,
    http: reqwest::Client,
    scopes: &'static [&'static str],
}

impl OAuthClient {
    pub fn new(
        endpoints: OAuthEndpoints,
        credentials: &OAuthCredentials,
        redirect_url: &str,
    ) -> Result<Self, ProviderError> {
        let invalid = |what: &str, err: url::ParseError| {
            ProviderError::Configuration(format!("invalid {what} URL: {err}"))
        };

        let client = BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(endpoints.auth_url.to_string()).map_err(|e| invalid("auth", e))?,
            )
            .set_token_uri(
                TokenUrl::new(endpoints.token_url.to_string()).map_err(|e| invalid("token", e))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(redirect_url.to_string()).map_err(|e| invalid("redirect", e))?,
            );

        // Following redirects from the token endpoint would leak the code
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            http,
            scopes: endpoints.scopes,
        })
    }

    pub fn authorize_url(&self, state: &str) -> String {
        let request = self.scopes.iter().fold(
            self.client
                .authorize_url(|| CsrfToken::new(state.to_string())),
            |request, scope| request.add_scope(Scope::new(scope.to_string())),
        );
        let (url, _) = request.url();
        url.to_string()
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange(&self, code: &str) -> Result<String, ProviderError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| ProviderError::Exchange(e.to_string()))?;

        Ok(token.access_token().secret().clone())
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Enabled providers by kind
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<OAuthProviderKind, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one of the same kind
    pub fn with(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn get(&self, kind: OAuthProviderKind) -> Result<Arc<dyn IdentityProvider>, ProviderError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or(ProviderError::NotConfigured(kind))
    }

    pub fn enabled(&self) -> Vec<OAuthProviderKind> {
        self.providers.keys().copied().collect()
    }

    /// Build the registry from configuration. Callbacks land on
    /// `{public_url}/api/auth/{provider}/callback`.
    pub fn from_config(config: &OAuthConfig, public_url: &str) -> Result<Self, ProviderError> {
        let callback = |kind: OAuthProviderKind| {
            format!("{}/api/auth/{kind}/callback", public_url.trim_end_matches('/'))
        };

        let mut registry = Self::new().with(Arc::new(github::GithubProvider::new(
            &config.github,
            &callback(OAuthProviderKind::Github),
        )?));

        if let Some(google) = &config.google {
            registry = registry.with(Arc::new(google::GoogleProvider::new(
                google,
                &callback(OAuthProviderKind::Google),
            )?));
        }

        Ok(registry)
    }
}
