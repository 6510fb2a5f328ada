//! Assignments repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::AssignmentStore;
use crate::{
    error::{AppError, AppResult},
    models::{Assignment, UpdateAssignment},
};

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for AssignmentsRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assignment>> {
        let row = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_all(&self) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>("SELECT * FROM assignments ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_resource(&self, resource_id: Uuid) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE resource_id = $1 ORDER BY created_at",
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_resource_and_user(
        &self,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE resource_id = $1 AND user_id = $2 ORDER BY created_at",
        )
        .bind(resource_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, data: &UpdateAssignment) -> AppResult<Option<Assignment>> {
        sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET user_id = $1, status = $2, assigned_date = $3, return_date = $4, updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.status)
        .bind(data.assigned_date)
        .bind(data.return_date)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_unique_violation(e, "Resource already has an open assignment")
        })
    }
}
