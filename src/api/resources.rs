//! Resource API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::resource::{CreateResource, Resource, ResourceSearch, UpdateResource},
};

/// Create a resource
#[utoipa::path(
    post,
    path = "/resources",
    tag = "resources",
    request_body = CreateResource,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 400, description = "Missing or blank field", body = crate::error::ErrorResponse),
        (status = 409, description = "Serial number already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_resource(
    State(state): State<crate::AppState>,
    WithRejection(Json(data), _): WithRejection<Json<CreateResource>, AppError>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    data.validate()?;
    let resource = state.services.resources.create(data.into()).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

/// Get resource by ID
#[utoipa::path(
    get,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource details", body = Resource),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_resource(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Resource>> {
    let resource = state.services.resources.get_by_id(id).await?;
    Ok(Json(resource))
}

/// List all resources
#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    responses(
        (status = 200, description = "Resource list", body = Vec<Resource>)
    )
)]
pub async fn list_resources(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Resource>>> {
    let resources = state.services.resources.list().await?;
    Ok(Json(resources))
}

/// Search resources by any combination of criteria
#[utoipa::path(
    post,
    path = "/resources/search",
    tag = "resources",
    request_body = ResourceSearch,
    responses(
        (status = 200, description = "Matching resources", body = Vec<Resource>),
        (status = 400, description = "Unknown sort field or inverted date range", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_resources(
    State(state): State<crate::AppState>,
    WithRejection(Json(search), _): WithRejection<Json<ResourceSearch>, AppError>,
) -> AppResult<Json<Vec<Resource>>> {
    let resources = state.services.resources.search(search).await?;
    Ok(Json(resources))
}

/// Update a resource
#[utoipa::path(
    put,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    request_body = UpdateResource,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_resource(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(data), _): WithRejection<Json<UpdateResource>, AppError>,
) -> AppResult<Json<Resource>> {
    data.validate()?;
    let resource = state.services.resources.update(id, &data).await?;
    Ok(Json(resource))
}

/// Delete a resource
#[utoipa::path(
    delete,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Resource is currently assigned", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_resource(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.resources.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
