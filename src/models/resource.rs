//! Resource (tracked equipment) model and search criteria

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::enums::{ResourceStatus, ResourceType, SortDirection, SortField};
use crate::error::{AppError, AppResult};

/// Resource record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    /// Free-text label, e.g. "Dell Latitude 7440"
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub serial_number: Option<String>,
    pub inventory_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Create resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResource {
    #[validate(custom(function = "non_blank", message = "Name cannot be blank"))]
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[validate(custom(function = "non_blank", message = "Serial number cannot be blank"))]
    pub serial_number: String,
    #[validate(custom(function = "non_blank", message = "Inventory location cannot be blank"))]
    pub inventory_location: String,
}

/// Update resource request; every field is overwritten
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResource {
    #[validate(custom(function = "non_blank", message = "Name cannot be blank"))]
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub serial_number: Option<String>,
    pub inventory_location: Option<String>,
}

/// Resource as handed to the store for insertion
#[derive(Debug, Clone)]
pub struct NewResource {
    pub name: String,
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub serial_number: Option<String>,
    pub inventory_location: Option<String>,
}

impl From<CreateResource> for NewResource {
    /// New resources always start out free
    fn from(data: CreateResource) -> Self {
        Self {
            name: data.name,
            resource_type: data.resource_type,
            status: ResourceStatus::NotAssigned,
            serial_number: Some(data.serial_number),
            inventory_location: Some(data.inventory_location),
        }
    }
}

/// Search request body
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSearch {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub status: Option<ResourceStatus>,
    /// Substring of the serial number
    pub serial_number: Option<String>,
    /// Lower creation bound, only applied together with `endDate`
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    /// Upper creation bound, only applied together with `startDate`
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    /// One of id, name, type, status, serialNumber, inventoryLocation, createdAt, updatedAt
    pub sort: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

/// RFC 3339 timestamp, or a zone-less `2022-01-01T00:00:00` read as UTC
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(instant) = raw.parse::<DateTime<Utc>>() {
        return Ok(Some(instant));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .map_err(|_| de::Error::custom(format!("invalid date-time: {}", raw)))
}

/// `None` sorts after every value, as NULLs do in an ascending SQL sort
fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Conjunctive resource filter; absent fields impose no constraint
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResourceFilter {
    pub name: Option<String>,
    pub resource_type: Option<ResourceType>,
    pub status: Option<ResourceStatus>,
    pub serial_number: Option<String>,
    /// Inclusive creation range
    pub created_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub sort: Option<(SortField, SortDirection)>,
}

impl TryFrom<ResourceSearch> for ResourceFilter {
    type Error = AppError;

    fn try_from(search: ResourceSearch) -> AppResult<Self> {
        let sort_field = search
            .sort
            .as_deref()
            .map(str::parse::<SortField>)
            .transpose()
            .map_err(AppError::Validation)?;

        let created_between = match (search.start_date, search.end_date) {
            (Some(start), Some(end)) if start > end => {
                return Err(AppError::Validation(format!(
                    "startDate {} is after endDate {}",
                    start, end
                )));
            }
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        };

        Ok(Self {
            name: search.name,
            resource_type: search.resource_type,
            status: search.status,
            serial_number: search.serial_number,
            created_between,
            sort: sort_field.zip(search.sort_direction),
        })
    }
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(ref name) = self.name {
            if !resource.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if self.resource_type.is_some_and(|t| t != resource.resource_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != resource.status) {
            return false;
        }
        if let Some(ref serial) = self.serial_number {
            match resource.serial_number {
                Some(ref value) if value.contains(serial.as_str()) => {}
                _ => return false,
            }
        }
        if let Some((start, end)) = self.created_between {
            if resource.created_at < start || resource.created_at > end {
                return false;
            }
        }
        true
    }

    /// Ordering requested by the filter, `Equal` when unsorted
    pub fn compare(&self, a: &Resource, b: &Resource) -> Ordering {
        let Some((field, direction)) = self.sort else {
            return Ordering::Equal;
        };
        let ordering = match field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Type => a.resource_type.as_str().cmp(b.resource_type.as_str()),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::SerialNumber => nulls_last(&a.serial_number, &b.serial_number),
            SortField::InventoryLocation => {
                nulls_last(&a.inventory_location, &b.inventory_location)
            }
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}
