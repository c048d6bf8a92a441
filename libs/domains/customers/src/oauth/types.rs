use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{Customer, OAuthLink, OAuthProviderKind};

/// The identity a provider vouched for after a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider: OAuthProviderKind,
    pub provider_id: String,
    /// Login name at the provider
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl OAuthProfile {
    /// The profile email, or a `{username}@{provider}.user` placeholder when
    /// the provider shared none.
    pub fn contact_email(&self) -> String {
        self.email
            .clone()
            .unwrap_or_else(|| format!("{}@{}.user", self.username, self.provider))
    }

    pub fn to_link(&self) -> OAuthLink {
        OAuthLink {
            display_name: self
                .display_name
                .clone()
                .or_else(|| Some(self.username.clone())),
            email: self.email.clone(),
            profile_url: self.avatar_url.clone(),
            ..OAuthLink::new(self.provider, self.provider_id.clone())
        }
    }
}

/// Result of a sign-in or refresh
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthPayload {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub customer: Customer,
}

/// Body of `POST /auth/github`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CodeExchangeRequest {
    #[validate(length(min = 1))]
    pub code: String,
}

/// Query parameters the provider appends to the callback URL
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
}
