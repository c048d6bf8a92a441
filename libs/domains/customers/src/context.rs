//! Per-request identity resolution.
//!
//! [`resolve_request_context`] runs once per request, before any handler,
//! and stores an immutable [`RequestContext`] in the request extensions.
//! Handlers read it through the [`CurrentContext`] extractor. Resolution
//! never fails: anything short of a valid token for an existing customer
//! yields an anonymous context and leaves the decision to the gate.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_helpers::{TokenService, extract_bearer_token};
use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::Customer;
use crate::repository::CustomerRepository;

/// Who is calling. Built once per request and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: Option<String>,
    customer: Option<Customer>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(token: Option<String>, customer: Option<Customer>) -> Self {
        Self { token, customer }
    }

    /// Raw bearer token as presented, whether or not it verified
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.customer.is_some()
    }
}

/// Turns request headers into a [`RequestContext`].
pub struct ContextResolver<R: CustomerRepository> {
    tokens: TokenService,
    repository: Arc<R>,
}

impl<R: CustomerRepository> ContextResolver<R> {
    pub fn new(tokens: TokenService, repository: Arc<R>) -> Self {
        Self { tokens, repository }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> RequestContext {
        let Some(token) = extract_bearer_token(headers) else {
            return RequestContext::anonymous();
        };
        let customer = self.load_customer(token).await;
        RequestContext::new(Some(token.to_string()), customer)
    }

    async fn load_customer(&self, token: &str) -> Option<Customer> {
        let verified = match self.tokens.verify(token) {
            Ok(verified) => verified,
            Err(err) => {
                tracing::debug!(error = %err, "Bearer token rejected");
                return None;
            }
        };

        let Ok(id) = Uuid::parse_str(&verified.customer_id) else {
            tracing::debug!(customer_id = %verified.customer_id, "Token subject is not a customer id");
            return None;
        };

        match self.repository.find_by_id(id).await {
            Ok(Some(customer)) => Some(customer),
            Ok(None) => {
                tracing::debug!(customer_id = %id, "Token refers to a missing customer");
                None
            }
            Err(err) => {
                tracing::warn!(customer_id = %id, error = %err, "Customer lookup failed during context resolution");
                None
            }
        }
    }
}

/// Middleware resolving the caller before the handler runs
///
/// ```ignore
/// let resolver = Arc::new(ContextResolver::new(tokens, repository));
/// let app = router.layer(middleware::from_fn_with_state(
///     resolver,
///     resolve_request_context::<MongoCustomerRepository>,
/// ));
/// ```
pub async fn resolve_request_context<R: CustomerRepository + 'static>(
    State(resolver): State<Arc<ContextResolver<R>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = resolver.resolve(request.headers()).await;
    request.extensions_mut().insert(Arc::new(context));
    next.run(request).await
}

/// Extractor for the resolved [`RequestContext`]. Anonymous when the
/// resolver middleware is not installed.
#[derive(Debug, Clone)]
pub struct CurrentContext(pub Arc<RequestContext>);

impl Deref for CurrentContext {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts
            .extensions
            .get::<Arc<RequestContext>>()
            .cloned()
            .unwrap_or_else(|| Arc::new(RequestContext::anonymous()));
        Ok(Self(context))
    }
}
