use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, AppResult, UuidPath,
    errors::responses::{
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
        ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::context::CurrentContext;
use crate::gate::require_authenticated;
use crate::models::{CreateCustomer, Customer, CustomerFilter, OAuthLink, UpdateCustomer};
use crate::repository::CustomerRepository;
use crate::service::CustomerService;

/// OpenAPI documentation for the Customers API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_customers,
        create_customer,
        current_customer,
        get_customer,
        update_customer,
        delete_customer,
    ),
    components(
        schemas(Customer, OAuthLink, CreateCustomer, UpdateCustomer),
        responses(
            ValidationErrorResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Customers", description = "Customer accounts")
    )
)]
pub struct ApiDoc;

/// Customer routes, mounted at `/customers`
pub fn router<R: CustomerRepository + 'static>(service: CustomerService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/me", get(current_customer))
        .route(
            "/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .with_state(shared_service)
}

/// List customers
#[utoipa::path(
    get,
    path = "",
    tag = "Customers",
    params(CustomerFilter),
    responses(
        (status = 200, description = "List of customers", body = Vec<Customer>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_customers<R: CustomerRepository>(
    State(service): State<Arc<CustomerService<R>>>,
    Query(filter): Query<CustomerFilter>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = service.list_customers(filter).await?;
    Ok(Json(customers))
}

/// Create the caller's customer profile
///
/// Fills in the record created at first sign-in; allowed once per customer.
#[utoipa::path(
    post,
    path = "",
    tag = "Customers",
    request_body = CreateCustomer,
    responses(
        (status = 201, description = "Customer profile created", body = Customer),
        (status = 404, response = NotFoundResponse),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_customer<R: CustomerRepository>(
    State(service): State<Arc<CustomerService<R>>>,
    context: CurrentContext,
    body: Result<Json<CreateCustomer>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let actor = require_authenticated(&context)?;
    let Json(input) = body?;

    let customer = service.create_customer(actor, input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// The calling customer
#[utoipa::path(
    get,
    path = "/me",
    tag = "Customers",
    responses(
        (status = 200, description = "Authenticated customer", body = Customer),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn current_customer(context: CurrentContext) -> AppResult<Json<Customer>> {
    let customer = require_authenticated(&context)?;
    Ok(Json(customer.clone()))
}

/// Get a customer by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Customers",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 400, response = ValidationErrorResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_customer<R: CustomerRepository>(
    State(service): State<Arc<CustomerService<R>>>,
    UuidPath(id): UuidPath,
) -> AppResult<Json<Customer>> {
    let customer = service.get_customer(id).await?;
    Ok(Json(customer))
}

/// Update the calling customer's record
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Customers",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    request_body = UpdateCustomer,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_customer<R: CustomerRepository>(
    State(service): State<Arc<CustomerService<R>>>,
    context: CurrentContext,
    id: Result<UuidPath, AppError>,
    body: Result<Json<UpdateCustomer>, JsonRejection>,
) -> AppResult<Json<Customer>> {
    let actor = require_authenticated(&context)?;
    let UuidPath(id) = id?;
    let Json(input) = body?;

    let customer = service.update_customer(actor, id, input).await?;
    Ok(Json(customer))
}

/// Delete the calling customer's record
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Customers",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_customer<R: CustomerRepository>(
    State(service): State<Arc<CustomerService<R>>>,
    context: CurrentContext,
    id: Result<UuidPath, AppError>,
) -> AppResult<StatusCode> {
    let actor = require_authenticated(&context)?;
    let UuidPath(id) = id?;

    service.delete_customer(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
