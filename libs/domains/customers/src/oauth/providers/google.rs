use async_trait::async_trait;
use serde::Deserialize;

use super::{IdentityProvider, OAuthClient, OAuthCredentials, OAuthEndpoints, ProviderError};
use crate::models::OAuthProviderKind;
use crate::oauth::types::OAuthProfile;

const ENDPOINTS: OAuthEndpoints = OAuthEndpoints {
    auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    scopes: &["openid", "email", "profile"],
};

const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Clone)]
pub struct GoogleProvider {
    oauth: OAuthClient,
    userinfo_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(credentials: &OAuthCredentials, redirect_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            oauth: OAuthClient::new(ENDPOINTS, credentials, redirect_url)?,
            userinfo_url: USERINFO_URL.to_string(),
        })
    }

    pub fn with_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, ProviderError> {
        let response = self
            .oauth
            .http()
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Profile(format!(
                "Google userinfo returned {}",
                response.status()
            )));
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| ProviderError::Profile(e.to_string()))?;

        // Unverified addresses could belong to someone else
        let email = info.email.filter(|_| info.email_verified);
        let username = email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .unwrap_or(&info.sub)
            .to_string();

        Ok(OAuthProfile {
            provider: OAuthProviderKind::Google,
            provider_id: info.sub,
            username,
            display_name: info.name,
            email,
            avatar_url: info.picture,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn kind(&self) -> OAuthProviderKind {
        OAuthProviderKind::Google
    }

    fn authorize_url(&self, state: &str) -> String {
        self.oauth.authorize_url(state)
    }

    async fn exchange_code_for_profile(&self, code: &str) -> Result<OAuthProfile, ProviderError> {
        let access_token = self.oauth.exchange(code).await?;
        self.fetch_profile(&access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::get};
    use serde_json::{Value, json};

    async fn userinfo(body: Value) -> String {
        let router = Router::new().route("/userinfo", get(move || async move { Json(body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/userinfo")
    }

    fn provider(url: String) -> GoogleProvider {
        GoogleProvider::new(
            &OAuthCredentials::new("id", "secret"),
            "http://localhost:8080/api/auth/google/callback",
        )
        .unwrap()
        .with_userinfo_url(url)
    }

    #[tokio::test]
    async fn test_verified_profile() {
        let url = userinfo(json!({
            "sub": "1099",
            "email": "ada@example.com",
            "email_verified": true,
            "name": "Ada",
            "picture": "https://lh3.example.com/a.png"
        }))
        .await;

        let profile = provider(url).fetch_profile("token").await.unwrap();
        assert_eq!(profile.provider, OAuthProviderKind::Google);
        assert_eq!(profile.provider_id, "1099");
        assert_eq!(profile.username, "ada");
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_unverified_email_dropped() {
        let url = userinfo(json!({
            "sub": "2001",
            "email": "maybe@example.com",
            "email_verified": false
        }))
        .await;

        let profile = provider(url).fetch_profile("token").await.unwrap();
        assert_eq!(profile.email, None);
        assert_eq!(profile.username, "2001");
        assert_eq!(profile.contact_email(), "2001@google.user");
    }

    #[test]
    fn test_authorize_url_scopes() {
        let url = provider("http://unused".to_string()).authorize_url("s1");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("scope=openid+email+profile"));
    }
}
