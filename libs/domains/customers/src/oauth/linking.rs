//! Find-or-create sign-in over external identities.
//!
//! ```text
//! Received ──exchange──▶ Exchanged ──lookup──▶ Matched ──▶ Resolved ──▶ Issued
//!     │                                           │
//!     └─ provider failure: Unauthorized           └─ no match: create customer
//! ```

use axum_helpers::TokenService;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{CustomerError, CustomerResult};
use crate::models::{Customer, OAuthProviderKind};
use crate::oauth::providers::ProviderRegistry;
use crate::oauth::types::{AuthPayload, OAuthProfile};
use crate::repository::{CustomerRepository, indexes};

pub struct IdentityLinkingService<R: CustomerRepository> {
    repository: Arc<R>,
    providers: ProviderRegistry,
    tokens: TokenService,
}

impl<R: CustomerRepository> IdentityLinkingService<R> {
    pub fn new(repository: Arc<R>, providers: ProviderRegistry, tokens: TokenService) -> Self {
        Self {
            repository,
            providers,
            tokens,
        }
    }

    /// Consent page URL for `provider` with a fresh random `state`.
    pub fn authorize_url(&self, provider: OAuthProviderKind) -> CustomerResult<String> {
        let provider = self.providers.get(provider)?;
        let state = Uuid::new_v4().simple().to_string();
        Ok(provider.authorize_url(&state))
    }

    /// Sign in with a one-time authorization code.
    ///
    /// The code is exchanged exactly once; a provider failure ends the
    /// attempt. The first sign-in for an identity creates its customer.
    #[instrument(skip(self, code), fields(provider = %provider))]
    pub async fn authenticate(
        &self,
        provider: OAuthProviderKind,
        code: &str,
    ) -> CustomerResult<AuthPayload> {
        let client = self.providers.get(provider)?;

        let profile = client.exchange_code_for_profile(code).await.map_err(|err| {
            tracing::error!(error = %err, "OAuth code exchange failed");
            CustomerError::from(err)
        })?;

        let customer = self.find_or_create(&profile).await?;
        tracing::info!(customer_id = %customer.id, provider_id = %profile.provider_id, "OAuth sign-in succeeded");

        self.issue(customer)
    }

    async fn find_or_create(&self, profile: &OAuthProfile) -> CustomerResult<Customer> {
        if let Some(customer) = self
            .repository
            .find_by_provider(profile.provider, &profile.provider_id)
            .await?
        {
            return Ok(customer);
        }

        match self.insert_identity(profile, Some(profile.contact_email())).await {
            // The address belongs to another customer; sign in without it
            Err(CustomerError::Duplicate(duplicate)) if duplicate.is_index(indexes::EMAIL) => {
                tracing::warn!(
                    provider_id = %profile.provider_id,
                    "Provider email already in use, creating customer without email"
                );
                self.insert_identity(profile, None).await
            }
            result => result,
        }
    }

    async fn insert_identity(
        &self,
        profile: &OAuthProfile,
        email: Option<String>,
    ) -> CustomerResult<Customer> {
        let candidate = Customer::with_identity(email, profile.to_link());

        match self.repository.create(candidate).await {
            Ok(customer) => {
                tracing::info!(customer_id = %customer.id, "Created customer for new identity");
                Ok(customer)
            }
            // A concurrent first sign-in for the same identity won the insert
            Err(CustomerError::Duplicate(duplicate)) if duplicate.is_index(indexes::OAUTH_IDENTITY) => {
                self.repository
                    .find_by_provider(profile.provider, &profile.provider_id)
                    .await?
                    .ok_or(CustomerError::Duplicate(duplicate))
            }
            Err(err) => Err(err),
        }
    }

    /// Issue a fresh token for the customer named by the caller's token.
    ///
    /// Uses the raw token from the context, so a valid token for a deleted
    /// customer reports `NotFound` rather than `Unauthenticated`.
    #[instrument(skip(self, context))]
    pub async fn refresh(&self, context: &RequestContext) -> CustomerResult<AuthPayload> {
        let token = context.token().ok_or(CustomerError::Unauthenticated)?;

        let verified = self.tokens.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "Refresh with unverifiable token");
            CustomerError::Unauthenticated
        })?;

        let id = Uuid::parse_str(&verified.customer_id).map_err(|_| CustomerError::Unauthenticated)?;

        let customer = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        self.issue(customer)
    }

    fn issue(&self, customer: Customer) -> CustomerResult<AuthPayload> {
        let issued = self.tokens.issue(&customer.id.to_string())?;
        Ok(AuthPayload {
            token: issued.token,
            expires_at: issued.expires_at,
            customer,
        })
    }
}
