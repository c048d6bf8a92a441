use async_trait::async_trait;
use serde::Deserialize;

use super::{IdentityProvider, OAuthClient, OAuthCredentials, OAuthEndpoints, ProviderError};
use crate::models::OAuthProviderKind;
use crate::oauth::types::OAuthProfile;

const ENDPOINTS: OAuthEndpoints = OAuthEndpoints {
    auth_url: "https://github.com/login/oauth/authorize",
    token_url: "https://github.com/login/oauth/access_token",
    scopes: &["read:user", "user:email"],
};

const API_BASE: &str = "https://api.github.com";

#[derive(Clone)]
pub struct GithubProvider {
    oauth: OAuthClient,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl GithubProvider {
    pub fn new(credentials: &OAuthCredentials, redirect_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            oauth: OAuthClient::new(ENDPOINTS, credentials, redirect_url)?,
            api_base: API_BASE.to_string(),
        })
    }

    /// Point profile requests at another REST API root (GitHub Enterprise).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Read the profile of the account behind `access_token`.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, ProviderError> {
        let response = self
            .oauth
            .http()
            .get(format!("{}/user", self.api_base))
            .bearer_auth(access_token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Profile(format!(
                "GitHub API returned {}",
                response.status()
            )));
        }

        let user: GithubUser = response
            .json()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => Some(email),
            None => self.fetch_primary_email(access_token).await,
        };

        Ok(OAuthProfile {
            provider: OAuthProviderKind::Github,
            provider_id: user.id.to_string(),
            username: user.login,
            display_name: user.name.filter(|n| !n.is_empty()),
            email,
            avatar_url: user.avatar_url,
        })
    }

    /// Primary verified address for accounts whose email is private.
    /// Missing scope or any API failure yields `None`.
    async fn fetch_primary_email(&self, access_token: &str) -> Option<String> {
        let response = self
            .oauth
            .http()
            .get(format!("{}/user/emails", self.api_base))
            .bearer_auth(access_token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "GitHub email lookup rejected");
            return None;
        }

        let emails: Vec<GithubEmail> = response.json().await.ok()?;
        emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email)
    }
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    fn kind(&self) -> OAuthProviderKind {
        OAuthProviderKind::Github
    }

    fn authorize_url(&self, state: &str) -> String {
        self.oauth.authorize_url(state)
    }

    async fn exchange_code_for_profile(&self, code: &str) -> Result<OAuthProfile, ProviderError> {
        let access_token = self.oauth.exchange(code).await?;
        self.fetch_profile(&access_token).await
    }
}
