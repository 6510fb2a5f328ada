//! Assignment (resource held by a user) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::enums::AssignmentStatus;

/// Assignment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub resource_id: Uuid,
    /// Borrowing user, opaque to this service
    pub user_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_date: NaiveDate,
    /// Unset while the assignment is open
    pub return_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn is_open(&self) -> bool {
        self.status == AssignmentStatus::NotReturned
    }
}

/// Create assignment request
///
/// Status and return date are not accepted: new assignments are always open.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignment {
    pub resource_id: Uuid,
    pub user_id: Uuid,
    /// Defaults to today
    pub assigned_date: Option<NaiveDate>,
}

/// Assignment as handed to the store for insertion
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_date: NaiveDate,
}

/// Update assignment request; every field is overwritten
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignment {
    pub user_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

/// Assignment search parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssignmentQuery {
    pub resource_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}
