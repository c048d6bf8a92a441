//! OpenAPI documentation configuration

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Registers the `bearer_auth` scheme referenced by mutating endpoints.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Herald API",
        version = "0.1.0",
        description = "Customer accounts with OAuth sign-in and scheduled announcements"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/auth", api = domain_customers::AuthApiDoc),
        (path = "/api/customers", api = domain_customers::ApiDoc),
        (path = "/api/announcements", api = domain_announcements::ApiDoc)
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;
