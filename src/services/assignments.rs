//! Assignment service
//!
//! Owns the hand-out / return state machine. A resource is handed out only
//! while `NOT_ASSIGNED`, which flips it to `ASSIGNED` and opens an assignment;
//! returning closes the assignment and frees the resource. Both writes of a
//! transition share one unit of work.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, InvalidState},
    models::{
        Assignment, AssignmentQuery, AssignmentStatus, CreateAssignment, NewAssignment,
        ResourceStatus, UpdateAssignment,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl AssignmentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Hand a free resource out to a user
    pub async fn create(&self, data: CreateAssignment) -> AppResult<Assignment> {
        let mut uow = self.repository.transactions.begin().await?;

        let resource = uow
            .resource_for_update(data.resource_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", data.resource_id)))?;

        if resource.status != ResourceStatus::NotAssigned {
            tracing::debug!(
                "Resource {} is {}, refusing assignment",
                resource.id,
                resource.status
            );
            return Err(InvalidState::ResourceNotAvailable(resource.id).into());
        }

        uow.set_resource_status(resource.id, ResourceStatus::Assigned)
            .await?;
        let assignment = uow
            .insert_assignment(&NewAssignment {
                resource_id: resource.id,
                user_id: data.user_id,
                status: AssignmentStatus::NotReturned,
                assigned_date: data.assigned_date.unwrap_or_else(today),
            })
            .await?;
        uow.commit().await?;

        tracing::info!(
            "Assigned resource {} to user {} (assignment {})",
            resource.id,
            assignment.user_id,
            assignment.id
        );
        Ok(assignment)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Assignment> {
        self.repository
            .assignments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Assignment>> {
        self.repository.assignments.find_all().await
    }

    /// Filter by resource and/or user; no key lists everything
    pub async fn search(&self, query: &AssignmentQuery) -> AppResult<Vec<Assignment>> {
        let assignments = &self.repository.assignments;
        match (query.resource_id, query.user_id) {
            (Some(resource_id), Some(user_id)) => {
                assignments.find_by_resource_and_user(resource_id, user_id).await
            }
            (Some(resource_id), None) => assignments.find_by_resource(resource_id).await,
            (None, Some(user_id)) => assignments.find_by_user(user_id).await,
            (None, None) => assignments.find_all().await,
        }
    }

    /// Overwrite user, status and dates.
    ///
    /// This does not touch the resource: changing the status here can leave
    /// the resource status out of step with its assignments.
    pub async fn update(&self, id: Uuid, data: &UpdateAssignment) -> AppResult<Assignment> {
        let existing = self.get_by_id(id).await?;

        if existing.status != data.status {
            tracing::warn!(
                "Assignment {} status changed {} -> {} outside return; resource {} left as is",
                id,
                existing.status,
                data.status,
                existing.resource_id
            );
        }

        self.repository
            .assignments
            .update(id, data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))
    }

    /// Delete an assignment, freeing its resource if it was still open
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut uow = self.repository.transactions.begin().await?;

        let assignment = uow
            .assignment_for_update(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

        if assignment.is_open() {
            uow.set_resource_status(assignment.resource_id, ResourceStatus::NotAssigned)
                .await?;
        }
        uow.delete_assignment(id).await?;
        uow.commit().await?;

        tracing::info!("Deleted assignment {}", id);
        Ok(())
    }

    /// Close an open assignment and free its resource
    pub async fn return_resource(&self, id: Uuid) -> AppResult<Assignment> {
        let mut uow = self.repository.transactions.begin().await?;

        let assignment = uow
            .assignment_for_update(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

        if assignment.status == AssignmentStatus::Returned {
            tracing::debug!("Assignment {} already returned", id);
            return Err(InvalidState::AlreadyReturned(id).into());
        }

        let returned = uow.close_assignment(id, today()).await?;
        uow.set_resource_status(returned.resource_id, ResourceStatus::NotAssigned)
            .await?;
        uow.commit().await?;

        tracing::info!(
            "Resource {} returned by user {} (assignment {})",
            returned.resource_id,
            returned.user_id,
            id
        );
        Ok(returned)
    }
}
