//! Assignment management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::assignment::{Assignment, AssignmentQuery, CreateAssignment, UpdateAssignment},
};

/// Hand a resource out to a user
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Malformed request body", body = crate::error::ErrorResponse),
        (status = 404, description = "Resource not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Resource not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_assignment(
    State(state): State<crate::AppState>,
    WithRejection(Json(data), _): WithRejection<Json<CreateAssignment>, AppError>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    let assignment = state.services.assignments.create(data).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Get assignment by ID
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = Assignment),
        (status = 404, description = "Assignment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_assignment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Assignment>> {
    let assignment = state.services.assignments.get_by_id(id).await?;
    Ok(Json(assignment))
}

/// List all assignments
#[utoipa::path(
    get,
    path = "/assignments",
    tag = "assignments",
    responses(
        (status = 200, description = "Assignment list", body = Vec<Assignment>)
    )
)]
pub async fn list_assignments(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Assignment>>> {
    let assignments = state.services.assignments.list().await?;
    Ok(Json(assignments))
}

/// Search assignments by resource and/or user
#[utoipa::path(
    get,
    path = "/assignments/search",
    tag = "assignments",
    params(AssignmentQuery),
    responses(
        (status = 200, description = "Matching assignments", body = Vec<Assignment>),
        (status = 400, description = "Malformed resource or user ID", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_assignments(
    State(state): State<crate::AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AssignmentQuery>, AppError>,
) -> AppResult<Json<Vec<Assignment>>> {
    let assignments = state.services.assignments.search(&query).await?;
    Ok(Json(assignments))
}

/// Overwrite an assignment (does not update the resource status)
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = UpdateAssignment,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 404, description = "Assignment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Resource already has an open assignment", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_assignment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(data), _): WithRejection<Json<UpdateAssignment>, AppError>,
) -> AppResult<Json<Assignment>> {
    let assignment = state.services.assignments.update(id, &data).await?;
    Ok(Json(assignment))
}

/// Delete an assignment
#[utoipa::path(
    delete,
    path = "/assignments/{id}",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_assignment(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.assignments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return an assigned resource
#[utoipa::path(
    post,
    path = "/assignments/{id}/return",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Resource returned", body = Assignment),
        (status = 404, description = "Assignment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_resource(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Assignment>> {
    let assignment = state.services.assignments.return_resource(id).await?;
    Ok(Json(assignment))
}
