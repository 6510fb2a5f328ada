//! Business logic services

pub mod assignments;
pub mod resources;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub resources: resources::ResourcesService,
    pub assignments: assignments::AssignmentsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            resources: resources::ResourcesService::new(repository.clone()),
            assignments: assignments::AssignmentsService::new(repository.clone()),
            repository,
        }
    }

    /// Check the backing store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.transactions.ping().await
    }
}
