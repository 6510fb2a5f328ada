//! Resources repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{contains_pattern, ResourceStore};
use crate::{
    error::{AppError, AppResult},
    models::{enums::SortDirection, NewResource, Resource, ResourceFilter, UpdateResource},
};

#[derive(Clone)]
pub struct ResourcesRepository {
    pool: Pool<Postgres>,
}

impl ResourcesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for ResourcesRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>> {
        let row = sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_all(&self) -> AppResult<Vec<Resource>> {
        let rows = sqlx::query_as::<_, Resource>("SELECT * FROM resources ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, data: &NewResource) -> AppResult<Resource> {
        let now = Utc::now();

        sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (id, name, resource_type, status, serial_number, inventory_location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.resource_type)
        .bind(data.status)
        .bind(&data.serial_number)
        .bind(&data.inventory_location)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_serial(e, data.serial_number.as_deref()))
    }

    async fn update(&self, id: Uuid, data: &UpdateResource) -> AppResult<Option<Resource>> {
        sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET name = $1, resource_type = $2, status = $3,
                serial_number = $4, inventory_location = $5, updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.resource_type)
        .bind(data.status)
        .bind(&data.serial_number)
        .bind(&data.inventory_location)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_serial(e, data.serial_number.as_deref()))
    }

    async fn search(&self, filter: &ResourceFilter) -> AppResult<Vec<Resource>> {
        let mut builder = search_query(filter);
        let rows = builder
            .build_query_as::<Resource>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn duplicate_serial(err: sqlx::Error, serial: Option<&str>) -> AppError {
    AppError::from_unique_violation(
        err,
        format!("Serial number {} is already registered", serial.unwrap_or_default()),
    )
}

/// Translate a filter into a parameterized SELECT
fn search_query(filter: &ResourceFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT * FROM resources WHERE 1=1");

    if let Some(ref name) = filter.name {
        builder.push(" AND name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(resource_type) = filter.resource_type {
        builder.push(" AND resource_type = ").push_bind(resource_type);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(ref serial) = filter.serial_number {
        builder.push(" AND serial_number LIKE ").push_bind(contains_pattern(serial));
    }
    if let Some((start, end)) = filter.created_between {
        builder
            .push(" AND created_at BETWEEN ")
            .push_bind(start)
            .push(" AND ")
            .push_bind(end);
    }
    if let Some((field, direction)) = filter.sort {
        // Column names come from a closed set, never from the request
        builder.push(" ORDER BY ").push(field.column()).push(match direction {
            SortDirection::Ascending => " ASC NULLS LAST",
            SortDirection::Descending => " DESC NULLS FIRST",
        });
    }

    builder
}
