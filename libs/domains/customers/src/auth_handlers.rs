//! Sign-in endpoints, mounted at `/auth`.
//!
//! - `GET  /auth/{provider}` redirects to the provider's consent page
//! - `GET  /auth/{provider}/callback?code=..` completes the browser flow
//! - `POST /auth/{provider}` with `{"code": ".."}` completes a client-driven flow
//! - `POST /auth/refresh` trades a valid token for a fresh one

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Redirect,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AppResult,
    errors::responses::{NotFoundResponse, UnauthorizedResponse, ValidationErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::context::CurrentContext;
use crate::models::OAuthProviderKind;
use crate::oauth::linking::IdentityLinkingService;
use crate::oauth::types::{AuthPayload, CallbackParams, CodeExchangeRequest};
use crate::repository::CustomerRepository;

#[derive(OpenApi)]
#[openapi(
    paths(authorize, callback, exchange_code, refresh_token),
    components(
        schemas(AuthPayload, CodeExchangeRequest, OAuthProviderKind),
        responses(ValidationErrorResponse, UnauthorizedResponse, NotFoundResponse)
    ),
    tags(
        (name = "Auth", description = "OAuth sign-in and token refresh")
    )
)]
pub struct AuthApiDoc;

pub fn auth_router<R: CustomerRepository + 'static>(service: IdentityLinkingService<R>) -> Router {
    Router::new()
        .route("/refresh", post(refresh_token))
        .route("/{provider}", get(authorize).post(exchange_code))
        .route("/{provider}/callback", get(callback))
        .with_state(Arc::new(service))
}

fn parse_provider(raw: &str) -> Result<OAuthProviderKind, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Unsupported OAuth provider '{raw}'")))
}

/// Redirect to the provider's consent page
#[utoipa::path(
    get,
    path = "/{provider}",
    tag = "Auth",
    params(("provider" = OAuthProviderKind, Path, description = "Identity provider")),
    responses(
        (status = 303, description = "Redirect to the provider"),
        (status = 400, response = ValidationErrorResponse)
    )
)]
async fn authorize<R: CustomerRepository>(
    State(service): State<Arc<IdentityLinkingService<R>>>,
    Path(provider): Path<String>,
) -> AppResult<Redirect> {
    let provider = parse_provider(&provider)?;
    let url = service.authorize_url(provider)?;
    Ok(Redirect::to(&url))
}

/// Provider callback: exchange the code and sign in
#[utoipa::path(
    get,
    path = "/{provider}/callback",
    tag = "Auth",
    params(
        ("provider" = OAuthProviderKind, Path, description = "Identity provider"),
        CallbackParams
    ),
    responses(
        (status = 200, description = "Signed in", body = AuthPayload),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn callback<R: CustomerRepository>(
    State(service): State<Arc<IdentityLinkingService<R>>>,
    Path(provider): Path<String>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> AppResult<Json<AuthPayload>> {
    let provider = parse_provider(&provider)?;
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;

    let payload = service.authenticate(provider, &params.code).await?;
    Ok(Json(payload))
}

/// Exchange an authorization code obtained by the client
#[utoipa::path(
    post,
    path = "/{provider}",
    tag = "Auth",
    params(("provider" = OAuthProviderKind, Path, description = "Identity provider")),
    request_body = CodeExchangeRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthPayload),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn exchange_code<R: CustomerRepository>(
    State(service): State<Arc<IdentityLinkingService<R>>>,
    Path(provider): Path<String>,
    body: Result<Json<CodeExchangeRequest>, JsonRejection>,
) -> AppResult<Json<AuthPayload>> {
    let provider = parse_provider(&provider)?;
    let Json(request) = body?;
    request.validate()?;

    let payload = service.authenticate(provider, &request.code).await?;
    Ok(Json(payload))
}

/// Issue a fresh token for the bearer of a valid one
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Token refreshed", body = AuthPayload),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn refresh_token<R: CustomerRepository>(
    State(service): State<Arc<IdentityLinkingService<R>>>,
    context: CurrentContext,
) -> AppResult<Json<AuthPayload>> {
    let payload = service.refresh(&context).await?;
    Ok(Json(payload))
}
