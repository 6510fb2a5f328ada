//! Resource service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, InvalidState},
    models::{NewResource, Resource, ResourceFilter, ResourceSearch, UpdateResource},
    repository::Repository,
};

#[derive(Clone)]
pub struct ResourcesService {
    repository: Repository,
}

impl ResourcesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Persist a resource as given
    pub async fn create(&self, data: NewResource) -> AppResult<Resource> {
        let resource = self.repository.resources.insert(&data).await?;
        tracing::info!("Created resource {} ({})", resource.id, resource.resource_type);
        Ok(resource)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Resource> {
        self.repository
            .resources
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Resource>> {
        self.repository.resources.find_all().await
    }

    /// Overwrite name, type, status, serial number and location
    pub async fn update(&self, id: Uuid, data: &UpdateResource) -> AppResult<Resource> {
        self.repository
            .resources
            .update(id, data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))
    }

    /// Delete a resource together with its returned assignments.
    ///
    /// A resource that is still held by someone cannot be deleted.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut uow = self.repository.transactions.begin().await?;

        if uow.resource_for_update(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Resource {} not found", id)));
        }
        if uow.has_open_assignment(id).await? {
            tracing::debug!("Refusing to delete resource {} with an open assignment", id);
            return Err(InvalidState::ResourceInUse(id).into());
        }
        uow.delete_resource(id).await?;
        uow.commit().await?;

        tracing::info!("Deleted resource {}", id);
        Ok(())
    }

    /// Search resources; every given criterion must match
    pub async fn search(&self, search: ResourceSearch) -> AppResult<Vec<Resource>> {
        let filter = ResourceFilter::try_from(search)?;
        self.repository.resources.search(&filter).await
    }
}
