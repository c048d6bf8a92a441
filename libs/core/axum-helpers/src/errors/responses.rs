//! Reusable OpenAPI responses matching [`ErrorResponse`].

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Validation failed",
    content_type = "application/json",
    example = json!({
        "message": "Validation failed",
        "extensions": {
            "code": "VALIDATION_ERROR",
            "statusCode": 400,
            "details": {
                "org_handle": [{ "code": "org_handle", "message": null, "params": { "value": "Bad Handle" } }]
            }
        }
    })
)]
pub struct ValidationErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Authentication required",
    content_type = "application/json",
    example = json!({
        "message": "Authentication required",
        "extensions": { "code": "UNAUTHORIZED", "statusCode": 401 }
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Authenticated but not allowed",
    content_type = "application/json",
    example = json!({
        "message": "Not authorized to perform this action",
        "extensions": { "code": "FORBIDDEN", "statusCode": 403 }
    })
)]
pub struct ForbiddenResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "message": "Customer not found",
        "extensions": { "code": "NOT_FOUND", "statusCode": 404 }
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Server-side failure",
    content_type = "application/json",
    example = json!({
        "message": "Database operation failed",
        "extensions": { "code": "DATABASE_ERROR", "statusCode": 500 }
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
