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
use domain_customers::{CurrentContext, require_authenticated};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{Announcement, AnnouncementFilter, CreateAnnouncement, UpdateAnnouncement};
use crate::repository::AnnouncementRepository;
use crate::service::AnnouncementService;

/// OpenAPI documentation for the Announcements API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_announcements,
        create_announcement,
        get_announcement,
        update_announcement,
        delete_announcement,
    ),
    components(
        schemas(Announcement, CreateAnnouncement, UpdateAnnouncement),
        responses(
            ValidationErrorResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Announcements", description = "Scheduled customer announcements")
    )
)]
pub struct ApiDoc;

/// Announcement routes, mounted at `/announcements`
pub fn router<R: AnnouncementRepository + 'static>(service: AnnouncementService<R>) -> Router {
    Router::new()
        .route("/", get(list_announcements).post(create_announcement))
        .route(
            "/{id}",
            get(get_announcement)
                .put(update_announcement)
                .delete(delete_announcement),
        )
        .with_state(Arc::new(service))
}

/// List announcements, soonest first
#[utoipa::path(
    get,
    path = "",
    tag = "Announcements",
    params(AnnouncementFilter),
    responses(
        (status = 200, description = "List of announcements", body = Vec<Announcement>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_announcements<R: AnnouncementRepository>(
    State(service): State<Arc<AnnouncementService<R>>>,
    Query(filter): Query<AnnouncementFilter>,
) -> AppResult<Json<Vec<Announcement>>> {
    let announcements = service.list_announcements(filter).await?;
    Ok(Json(announcements))
}

/// Schedule an announcement for the calling customer
#[utoipa::path(
    post,
    path = "",
    tag = "Announcements",
    request_body = CreateAnnouncement,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_announcement<R: AnnouncementRepository>(
    State(service): State<Arc<AnnouncementService<R>>>,
    context: CurrentContext,
    body: Result<Json<CreateAnnouncement>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let actor = require_authenticated(&context)?;
    let Json(input) = body?;

    let announcement = service.create_announcement(actor, input).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// Get an announcement by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Announcements",
    params(
        ("id" = Uuid, Path, description = "Announcement ID")
    ),
    responses(
        (status = 200, description = "Announcement found", body = Announcement),
        (status = 400, response = ValidationErrorResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_announcement<R: AnnouncementRepository>(
    State(service): State<Arc<AnnouncementService<R>>>,
    UuidPath(id): UuidPath,
) -> AppResult<Json<Announcement>> {
    let announcement = service.get_announcement(id).await?;
    Ok(Json(announcement))
}

/// Update one of the calling customer's announcements
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Announcements",
    params(
        ("id" = Uuid, Path, description = "Announcement ID")
    ),
    request_body = UpdateAnnouncement,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_announcement<R: AnnouncementRepository>(
    State(service): State<Arc<AnnouncementService<R>>>,
    context: CurrentContext,
    id: Result<UuidPath, AppError>,
    body: Result<Json<UpdateAnnouncement>, JsonRejection>,
) -> AppResult<Json<Announcement>> {
    let actor = require_authenticated(&context)?;
    let UuidPath(id) = id?;
    let Json(input) = body?;

    let announcement = service.update_announcement(actor, id, input).await?;
    Ok(Json(announcement))
}

/// Delete one of the calling customer's announcements
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Announcements",
    params(
        ("id" = Uuid, Path, description = "Announcement ID")
    ),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_announcement<R: AnnouncementRepository>(
    State(service): State<Arc<AnnouncementService<R>>>,
    context: CurrentContext,
    id: Result<UuidPath, AppError>,
) -> AppResult<StatusCode> {
    let actor = require_authenticated(&context)?;
    let UuidPath(id) = id?;

    service.delete_announcement(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
