//! In-memory store
//!
//! Keeps both tables in insertion-ordered maps behind one mutex. A unit of
//! work holds the mutex for its whole lifetime and edits a private copy of
//! the tables, which replaces the shared state only on `commit`. The same
//! uniqueness rules as the SQL schema are enforced here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{AssignmentStore, ResourceStore, TransactionSource, UnitOfWork};
use crate::{
    error::{AppError, AppResult},
    models::{
        Assignment, AssignmentStatus, NewAssignment, NewResource, Resource, ResourceFilter,
        ResourceStatus, UpdateAssignment, UpdateResource,
    },
};

#[derive(Debug, Default, Clone)]
struct Tables {
    resources: IndexMap<Uuid, Resource>,
    assignments: IndexMap<Uuid, Assignment>,
}

impl Tables {
    fn ensure_unique_serial(&self, serial: Option<&str>, except: Option<Uuid>) -> AppResult<()> {
        let Some(serial) = serial else {
            return Ok(());
        };
        let taken = self
            .resources
            .values()
            .any(|r| Some(r.id) != except && r.serial_number.as_deref() == Some(serial));
        if taken {
            return Err(AppError::Conflict(format!(
                "Serial number {} is already registered",
                serial
            )));
        }
        Ok(())
    }

    fn ensure_single_open(&self, resource_id: Uuid, except: Option<Uuid>) -> AppResult<()> {
        let open = self
            .assignments
            .values()
            .any(|a| Some(a.id) != except && a.resource_id == resource_id && a.is_open());
        if open {
            return Err(AppError::Conflict(format!(
                "Resource {} already has an open assignment",
                resource_id
            )));
        }
        Ok(())
    }

    fn insert_resource(&mut self, data: &NewResource) -> AppResult<Resource> {
        self.ensure_unique_serial(data.serial_number.as_deref(), None)?;
        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            resource_type: data.resource_type,
            status: data.status,
            serial_number: data.serial_number.clone(),
            inventory_location: data.inventory_location.clone(),
            created_at: now,
            updated_at: now,
        };
        self.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    fn update_resource(&mut self, id: Uuid, data: &UpdateResource) -> AppResult<Option<Resource>> {
        if !self.resources.contains_key(&id) {
            return Ok(None);
        }
        self.ensure_unique_serial(data.serial_number.as_deref(), Some(id))?;
        let Some(resource) = self.resources.get_mut(&id) else {
            return Ok(None);
        };
        resource.name = data.name.clone();
        resource.resource_type = data.resource_type;
        resource.status = data.status;
        resource.serial_number = data.serial_number.clone();
        resource.inventory_location = data.inventory_location.clone();
        resource.updated_at = Utc::now();
        Ok(Some(resource.clone()))
    }

    fn set_resource_status(&mut self, id: Uuid, status: ResourceStatus) -> AppResult<Resource> {
        let resource = self
            .resources
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))?;
        resource.status = status;
        resource.updated_at = Utc::now();
        Ok(resource.clone())
    }

    fn insert_assignment(&mut self, data: &NewAssignment) -> AppResult<Assignment> {
        if !self.resources.contains_key(&data.resource_id) {
            return Err(AppError::NotFound(format!("Resource {} not found", data.resource_id)));
        }
        if data.status == AssignmentStatus::NotReturned {
            self.ensure_single_open(data.resource_id, None)?;
        }
        let now = Utc::now();
        let assignment = Assignment {
            id: Uuid::new_v4(),
            resource_id: data.resource_id,
            user_id: data.user_id,
            status: data.status,
            assigned_date: data.assigned_date,
            return_date: None,
            created_at: now,
            updated_at: now,
        };
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    fn update_assignment(
        &mut self,
        id: Uuid,
        data: &UpdateAssignment,
    ) -> AppResult<Option<Assignment>> {
        let Some(resource_id) = self.assignments.get(&id).map(|a| a.resource_id) else {
            return Ok(None);
        };
        if data.status == AssignmentStatus::NotReturned {
            self.ensure_single_open(resource_id, Some(id))?;
        }
        let Some(assignment) = self.assignments.get_mut(&id) else {
            return Ok(None);
        };
        assignment.user_id = data.user_id;
        assignment.status = data.status;
        assignment.assigned_date = data.assigned_date;
        assignment.return_date = data.return_date;
        assignment.updated_at = Utc::now();
        Ok(Some(assignment.clone()))
    }

    fn close_assignment(&mut self, id: Uuid, return_date: NaiveDate) -> AppResult<Assignment> {
        let assignment = self
            .assignments
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;
        assignment.status = AssignmentStatus::Returned;
        assignment.return_date = Some(return_date);
        assignment.updated_at = Utc::now();
        Ok(assignment.clone())
    }

    fn delete_resource(&mut self, id: Uuid) -> bool {
        if self.resources.shift_remove(&id).is_none() {
            return false;
        }
        self.assignments.retain(|_, a| a.resource_id != id);
        true
    }

    fn assignments_where(&self, predicate: impl Fn(&Assignment) -> bool) -> Vec<Assignment> {
        self.assignments
            .values()
            .filter(|a| predicate(a))
            .cloned()
            .collect()
    }
}

/// Store keeping everything in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self.tables.lock().await.resources.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Resource>> {
        Ok(self.tables.lock().await.resources.values().cloned().collect())
    }

    async fn insert(&self, data: &NewResource) -> AppResult<Resource> {
        self.tables.lock().await.insert_resource(data)
    }

    async fn update(&self, id: Uuid, data: &UpdateResource) -> AppResult<Option<Resource>> {
        self.tables.lock().await.update_resource(id, data)
    }

    async fn search(&self, filter: &ResourceFilter) -> AppResult<Vec<Resource>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Resource> = tables
            .resources
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| filter.compare(a, b));
        Ok(rows)
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assignment>> {
        Ok(self.tables.lock().await.assignments.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Assignment>> {
        Ok(self.tables.lock().await.assignments_where(|_| true))
    }

    async fn find_by_resource(&self, resource_id: Uuid) -> AppResult<Vec<Assignment>> {
        Ok(self
            .tables
            .lock()
            .await
            .assignments_where(|a| a.resource_id == resource_id))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Assignment>> {
        Ok(self.tables.lock().await.assignments_where(|a| a.user_id == user_id))
    }

    async fn find_by_resource_and_user(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<Assignment>> {
        Ok(self
            .tables
            .lock()
            .await
            .assignments_where(|a| a.resource_id == resource_id && a.user_id == user_id))
    }

    async fn update(&self, id: Uuid, data: &UpdateAssignment) -> AppResult<Option<Assignment>> {
        self.tables.lock().await.update_assignment(id, data)
    }
}

#[async_trait]
impl TransactionSource for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn resource_for_update(&mut self, id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self.working.resources.get(&id).cloned())
    }

    async fn assignment_for_update(&mut self, id: Uuid) -> AppResult<Option<Assignment>> {
        Ok(self.working.assignments.get(&id).cloned())
    }

    async fn set_resource_status(&mut self, id: Uuid, status: ResourceStatus) -> AppResult<Resource> {
        self.working.set_resource_status(id, status)
    }

    async fn insert_assignment(&mut self, data: &NewAssignment) -> AppResult<Assignment> {
        self.working.insert_assignment(data)
    }

    async fn close_assignment(&mut self, id: Uuid, return_date: NaiveDate) -> AppResult<Assignment> {
        self.working.close_assignment(id, return_date)
    }

    async fn has_open_assignment(&mut self, resource_id: Uuid) -> AppResult<bool> {
        Ok(self
            .working
            .assignments
            .values()
            .any(|a| a.resource_id == resource_id && a.is_open()))
    }

    async fn delete_resource(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.delete_resource(id))
    }

    async fn delete_assignment(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.assignments.shift_remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
