//! Repository layer for database operations
//!
//! Plain reads and single-row writes go through [`ResourceStore`] and
//! [`AssignmentStore`]. Operations that touch a resource and an assignment
//! together run inside a [`UnitOfWork`] obtained from [`TransactionSource`]:
//! nothing it writes is visible until `commit`, and dropping it rolls back.

pub mod assignments;
pub mod memory;
pub mod resources;
pub mod transaction;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Assignment, NewAssignment, NewResource, Resource, ResourceFilter, ResourceStatus,
        UpdateAssignment, UpdateResource,
    },
};

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>>;

    async fn find_all(&self) -> AppResult<Vec<Resource>>;

    async fn insert(&self, data: &NewResource) -> AppResult<Resource>;

    /// Overwrite the mutable fields; `None` when the id is unknown
    async fn update(&self, id: Uuid, data: &UpdateResource) -> AppResult<Option<Resource>>;

    async fn search(&self, filter: &ResourceFilter) -> AppResult<Vec<Resource>>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assignment>>;

    async fn find_all(&self) -> AppResult<Vec<Assignment>>;

    async fn find_by_resource(&self, resource_id: Uuid) -> AppResult<Vec<Assignment>>;

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Assignment>>;

    async fn find_by_resource_and_user(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<Assignment>>;

    /// Overwrite the mutable fields; `None` when the id is unknown
    async fn update(&self, id: Uuid, data: &UpdateAssignment) -> AppResult<Option<Assignment>>;
}

/// Transaction-scoped access to both tables
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read a resource and keep it locked until the unit of work ends
    async fn resource_for_update(&mut self, id: Uuid) -> AppResult<Option<Resource>>;

    /// Read an assignment and keep it locked until the unit of work ends
    async fn assignment_for_update(&mut self, id: Uuid) -> AppResult<Option<Assignment>>;

    async fn set_resource_status(&mut self, id: Uuid, status: ResourceStatus) -> AppResult<Resource>;

    async fn insert_assignment(&mut self, data: &NewAssignment) -> AppResult<Assignment>;

    /// Mark an assignment returned on the given date
    async fn close_assignment(&mut self, id: Uuid, return_date: NaiveDate) -> AppResult<Assignment>;

    async fn has_open_assignment(&mut self, resource_id: Uuid) -> AppResult<bool>;

    /// Delete a resource and its assignment history; `false` when absent
    async fn delete_resource(&mut self, id: Uuid) -> AppResult<bool>;

    /// `false` when absent
    async fn delete_assignment(&mut self, id: Uuid) -> AppResult<bool>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the store handles
#[derive(Clone)]
pub struct Repository {
    pub resources: Arc<dyn ResourceStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub transactions: Arc<dyn TransactionSource>,
}

impl Repository {
    /// Create a repository backed by the given PostgreSQL pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            resources: Arc::new(resources::ResourcesRepository::new(pool.clone())),
            assignments: Arc::new(assignments::AssignmentsRepository::new(pool.clone())),
            transactions: Arc::new(transaction::PgTransactions::new(pool)),
        }
    }

    /// Create a repository backed by process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            resources: store.clone(),
            assignments: store.clone(),
            transactions: store,
        }
    }
}

/// Build a LIKE pattern matching `value` anywhere, with wildcards in `value` escaped
pub(crate) fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
