use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use axum_helpers::{JwtConfig, TokenService};
use domain_customers::{
    ContextResolver, Customer, CustomerFilter, CustomerRepository, CustomerService, IdentityLinkingService,
    IdentityProvider, InMemoryCustomerRepository, OAuthProfile, OAuthProviderKind, ProviderError,
    ProviderRegistry, auth_handlers, handlers, resolve_request_context,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "handler-tests-secret-with-enough-length";

/// Accepts the code "good-<id>" and signs in GitHub account `<id>`.
struct FakeGithub;

#[async_trait]
impl IdentityProvider for FakeGithub {
    fn kind(&self) -> OAuthProviderKind {
        OAuthProviderKind::Github
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://github.test/login/oauth/authorize?state={state}")
    }

    async fn exchange_code_for_profile(&self, code: &str) -> Result<OAuthProfile, ProviderError> {
        let id = code
            .strip_prefix("good-")
            .ok_or_else(|| ProviderError::Exchange("bad_verification_code".to_string()))?;
        Ok(OAuthProfile {
            provider: OAuthProviderKind::Github,
            provider_id: id.to_string(),
            username: format!("user{id}"),
            display_name: None,
            email: None,
            avatar_url: None,
        })
    }
}

fn tokens() -> TokenService {
    TokenService::new(&JwtConfig::new(SECRET, Duration::from_secs(3600)).unwrap())
}

fn app(repository: Arc<InMemoryCustomerRepository>) -> Router {
    let tokens = tokens();
    let providers = ProviderRegistry::new().with(Arc::new(FakeGithub));
    let resolver = Arc::new(ContextResolver::new(tokens.clone(), repository.clone()));

    Router::new()
        .nest(
            "/customers",
            handlers::router(CustomerService::new(repository.clone())),
        )
        .nest(
            "/auth",
            auth_handlers::auth_router(IdentityLinkingService::new(repository, providers, tokens)),
        )
        .layer(middleware::from_fn_with_state(
            resolver,
            resolve_request_context::<InMemoryCustomerRepository>,
        ))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Sign in through the code exchange endpoint and return (token, customer id).
async fn sign_in(app: &Router, account: &str) -> (String, String) {
    let body = json!({ "code": format!("good-{account}") }).to_string();
    let (status, payload) = send(app, request("POST", "/auth/github", None, Some(&body))).await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {payload}");
    (
        payload["token"].as_str().unwrap().to_string(),
        payload["customer"]["_id"].as_str().unwrap().to_string(),
    )
}

fn assert_error(body: &Value, code: &str, status: u16) {
    assert_eq!(body["extensions"]["code"], json!(code));
    assert_eq!(body["extensions"]["statusCode"], json!(status));
}

#[tokio::test]
async fn test_sign_in_creates_customer_with_placeholder_email() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));

    let body = json!({ "code": "good-583231" }).to_string();
    let (status, payload) = send(&app, request("POST", "/auth/github", None, Some(&body))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(payload["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(payload["customer"]["email"], json!("user583231@github.user"));
    assert_eq!(payload["customer"]["account_setup_complete"], json!(false));
    assert_eq!(
        payload["customer"]["oauth_providers"][0]["provider_id"],
        json!("583231")
    );
}

#[tokio::test]
async fn test_repeat_sign_in_returns_same_customer() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (_, first) = sign_in(&app, "7").await;
    let (_, second) = sign_in(&app, "7").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_callback_route_signs_in() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, payload) = send(
        &app,
        request("GET", "/auth/github/callback?code=good-11&state=abc", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payload["customer"]["oauth_providers"][0]["display_name"],
        json!("user11")
    );
}

#[tokio::test]
async fn test_callback_without_code() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, payload) = send(&app, request("GET", "/auth/github/callback", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);
}

#[tokio::test]
async fn test_bad_code_is_unauthorized() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let body = json!({ "code": "stolen" }).to_string();
    let (status, payload) = send(&app, request("POST", "/auth/github", None, Some(&body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&payload, "UNAUTHORIZED", 401);
}

#[tokio::test]
async fn test_unknown_and_disabled_providers() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));

    let (status, payload) = send(&app, request("GET", "/auth/gitlab", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);

    let body = json!({ "code": "good-1" }).to_string();
    let (status, payload) = send(&app, request("POST", "/auth/google", None, Some(&body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);
}

#[tokio::test]
async fn test_authorize_redirects() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let response = app
        .clone()
        .oneshot(request("GET", "/auth/github", None, None))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://github.test/login/oauth/authorize?state="));
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, payload) = send(&app, request("GET", "/customers/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["message"], json!("Authentication required"));
    assert_error(&payload, "UNAUTHORIZED", 401);
}

#[tokio::test]
async fn test_me_with_token() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (token, id) = sign_in(&app, "5").await;

    let (status, payload) = send(&app, request("GET", "/customers/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["_id"], json!(id));
}

#[tokio::test]
async fn test_malformed_token_is_anonymous() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, _) = send(&app, request("GET", "/customers/me", Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reads stay open to anonymous callers, even with a bad token
    let (status, _) = send(&app, request("GET", "/customers", Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_gate_runs_before_body_parsing() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, payload) = send(
        &app,
        request("POST", "/customers", None, Some("{ not json")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&payload, "UNAUTHORIZED", 401);
}

#[tokio::test]
async fn test_gate_runs_before_validation() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let body = json!({ "org_name": "", "org_handle": "Bad Handle" }).to_string();
    let (status, _) = send(&app, request("POST", "/customers", None, Some(&body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_create_without_token_writes_nothing() {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let app = app(repository.clone());

    let body = json!({ "org_name": "Acme", "org_handle": "acme" }).to_string();
    let (status, payload) = send(&app, request("POST", "/customers", None, Some(&body))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&payload, "UNAUTHORIZED", 401);
    assert!(repository.list(CustomerFilter::default()).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_sign_ins_converge() {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let app = app(repository.clone());

    let callbacks: Vec<_> = (0..16)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let body = json!({ "code": "good-42" }).to_string();
                send(&app, request("POST", "/auth/github", None, Some(&body))).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for callback in callbacks {
        let (status, payload) = callback.await.unwrap();
        assert_eq!(status, StatusCode::OK, "sign-in failed: {payload}");
        ids.push(payload["customer"]["_id"].as_str().unwrap().to_string());
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1);
    let stored = repository.list(CustomerFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.to_string(), ids[0]);
}

#[tokio::test]
async fn test_create_customer_validation() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (token, _) = sign_in(&app, "1").await;

    let body = json!({
        "org_name": "Acme",
        "org_handle": "acme--inc",
        "timezone": "Not/AZone",
        "phone": "0000"
    })
    .to_string();
    let (status, payload) = send(&app, request("POST", "/customers", Some(&token), Some(&body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);
    let details = &payload["extensions"]["details"];
    assert!(details.get("org_handle").is_some());
    assert!(details.get("timezone").is_some());
    assert!(details.get("phone").is_some());
}

#[tokio::test]
async fn test_malformed_body_after_gate_is_validation_error() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (token, _) = sign_in(&app, "1").await;

    let (status, payload) = send(
        &app,
        request("POST", "/customers", Some(&token), Some("{ not json")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);
}

#[tokio::test]
async fn test_create_and_fetch_customer() {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let app = app(repository.clone());
    let (token, id) = sign_in(&app, "1").await;

    let body = json!({
        "org_name": "Acme",
        "org_handle": "acme",
        "email": "ops@acme.test",
        "account_setup_complete": true
    })
    .to_string();
    let (status, created) =
        send(&app, request("POST", "/customers", Some(&token), Some(&body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["_id"], json!(id));
    assert_eq!(created["timezone"], json!("UTC"));
    assert_eq!(created["marketing_consent"], json!(false));
    assert_eq!(created["email"], json!("ops@acme.test"));
    assert_eq!(created["oauth_providers"][0]["provider_id"], json!("1"));
    assert_eq!(created["account_setup_complete"], json!(true));

    let uri = format!("/customers/{id}");
    let (status, fetched) = send(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["org_handle"], json!("acme"));

    let (status, payload) = send(&app, request("POST", "/customers", Some(&token), Some(&body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);

    let rename = json!({ "org_name": "Acme Two" }).to_string();
    let (status, updated) = send(&app, request("PUT", &uri, Some(&token), Some(&rename))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["org_name"], json!("Acme Two"));

    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(repository.list(CustomerFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_missing_customer() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let uri = format!("/customers/{}", Uuid::now_v7());
    let (status, payload) = send(&app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["message"], json!("Customer not found"));
}

#[tokio::test]
async fn test_get_with_invalid_id() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, payload) = send(&app, request("GET", "/customers/not-a-uuid", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&payload, "VALIDATION_ERROR", 400);
}

#[tokio::test]
async fn test_update_own_record_completes_setup() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (token, id) = sign_in(&app, "1").await;

    let body = json!({ "org_name": "Acme", "org_handle": "acme" }).to_string();
    let uri = format!("/customers/{id}");
    let (status, updated) = send(&app, request("PUT", &uri, Some(&token), Some(&body))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["account_setup_complete"], json!(true));
}

#[tokio::test]
async fn test_update_other_customer_is_forbidden() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (token, _) = sign_in(&app, "1").await;
    let (_, other) = sign_in(&app, "2").await;

    let body = json!({ "org_name": "Hijacked" }).to_string();
    let uri = format!("/customers/{other}");
    let (status, payload) = send(&app, request("PUT", &uri, Some(&token), Some(&body))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&payload, "FORBIDDEN", 403);

    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_without_token_with_invalid_id_is_unauthorized() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let (status, _) = send(
        &app,
        request("PUT", "/customers/not-a-uuid", None, Some("{}")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_flow() {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let app = app(repository.clone());

    let (status, payload) = send(&app, request("POST", "/auth/refresh", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&payload, "UNAUTHORIZED", 401);

    let (token, id) = sign_in(&app, "1").await;
    let (status, payload) = send(&app, request("POST", "/auth/refresh", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["customer"]["_id"], json!(id));

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/customers/{id}"), Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, payload) = send(&app, request("POST", "/auth/refresh", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&payload, "NOT_FOUND", 404);
}

#[tokio::test]
async fn test_refresh_with_token_from_other_secret() {
    let app = app(Arc::new(InMemoryCustomerRepository::new()));
    let foreign = TokenService::new(
        &JwtConfig::new("some-other-service-secret-0123456789", Duration::from_secs(60)).unwrap(),
    );
    let token = foreign.issue(&Uuid::now_v7().to_string()).unwrap().token;

    let (status, _) = send(&app, request("POST", "/auth/refresh", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_customer_created_out_of_band() {
    let repository = Arc::new(InMemoryCustomerRepository::new());
    let app = app(repository.clone());

    let customer = repository
        .create(Customer::new(
            serde_json::from_value(json!({ "org_name": "Direct", "org_handle": "direct" })).unwrap(),
        ))
        .await
        .unwrap();
    let token = tokens().issue(&customer.id.to_string()).unwrap().token;

    let (status, payload) = send(&app, request("GET", "/customers/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["org_handle"], json!("direct"));
}
