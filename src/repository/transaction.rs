//! PostgreSQL units of work
//!
//! Rows read through `*_for_update` are locked with `SELECT ... FOR UPDATE`,
//! so two transitions on the same resource or assignment run one after the
//! other instead of both passing their status checks.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use super::{TransactionSource, UnitOfWork};
use crate::{
    error::{AppError, AppResult},
    models::{Assignment, AssignmentStatus, NewAssignment, Resource, ResourceStatus},
};

#[derive(Clone)]
pub struct PgTransactions {
    pool: Pool<Postgres>,
}

impl PgTransactions {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionSource for PgTransactions {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn resource_for_update(&mut self, id: Uuid) -> AppResult<Option<Resource>> {
        let row = sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn assignment_for_update(&mut self, id: Uuid) -> AppResult<Option<Assignment>> {
        let row =
            sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(row)
    }

    async fn set_resource_status(&mut self, id: Uuid, status: ResourceStatus) -> AppResult<Resource> {
        sqlx::query_as::<_, Resource>(
            "UPDATE resources SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))
    }

    async fn insert_assignment(&mut self, data: &NewAssignment) -> AppResult<Assignment> {
        let now = Utc::now();

        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (id, resource_id, user_id, status, assigned_date, return_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NULL, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.resource_id)
        .bind(data.user_id)
        .bind(data.status)
        .bind(data.assigned_date)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            AppError::from_unique_violation(
                e,
                format!("Resource {} already has an open assignment", data.resource_id),
            )
        })
    }

    async fn close_assignment(&mut self, id: Uuid, return_date: NaiveDate) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET status = $1, return_date = $2, updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(AssignmentStatus::Returned)
        .bind(return_date)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))
    }

    async fn has_open_assignment(&mut self, resource_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assignments WHERE resource_id = $1 AND status = $2)",
        )
        .bind(resource_id)
        .bind(AssignmentStatus::NotReturned)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn delete_resource(&mut self, id: Uuid) -> AppResult<bool> {
        // Assignment history goes with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_assignment(&mut self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
