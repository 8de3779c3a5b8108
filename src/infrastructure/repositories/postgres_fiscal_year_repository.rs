use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::fiscal_year::FiscalYear;
use crate::domain::repositories::{FiscalYearRepository, RepositoryError, RepositoryResult};
use crate::infrastructure::database::map_sqlx_error;

/// PostgreSQL implementation of FiscalYearRepository
pub struct PostgresFiscalYearRepository {
    pool: PgPool,
}

impl PostgresFiscalYearRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FiscalYearRepository for PostgresFiscalYearRepository {
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<FiscalYear>> {
        sqlx::query_as::<_, FiscalYear>(
            r#"
            SELECT id, organization_id, name, start_date, end_date, status, created_at
            FROM fiscal_years
            WHERE organization_id = $1
            ORDER BY start_date DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list fiscal years", e))
    }

    async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<FiscalYear>> {
        sqlx::query_as::<_, FiscalYear>(
            r#"
            SELECT id, organization_id, name, start_date, end_date, status, created_at
            FROM fiscal_years
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find fiscal year by id", e))
    }

    async fn find_overlapping(
        &self,
        organization_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> RepositoryResult<Vec<FiscalYear>> {
        sqlx::query_as::<_, FiscalYear>(
            r#"
            SELECT id, organization_id, name, start_date, end_date, status, created_at
            FROM fiscal_years
            WHERE organization_id = $1
              AND start_date <= $3
              AND $2 <= end_date
              AND ($4::uuid IS NULL OR id <> $4)
            ORDER BY start_date
            "#,
        )
        .bind(organization_id)
        .bind(start_date)
        .bind(end_date)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find overlapping fiscal years", e))
    }

    async fn create(&self, fiscal_year: &FiscalYear) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fiscal_years (id, organization_id, name, start_date, end_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(fiscal_year.id)
        .bind(fiscal_year.organization_id)
        .bind(&fiscal_year.name)
        .bind(fiscal_year.start_date)
        .bind(fiscal_year.end_date)
        .bind(fiscal_year.status)
        .bind(fiscal_year.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create fiscal year", e))?;

        Ok(())
    }

    async fn update(&self, fiscal_year: &FiscalYear) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE fiscal_years
            SET name = $3, start_date = $4, end_date = $5, status = $6
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(fiscal_year.organization_id)
        .bind(fiscal_year.id)
        .bind(&fiscal_year.name)
        .bind(fiscal_year.start_date)
        .bind(fiscal_year.end_date)
        .bind(fiscal_year.status)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update fiscal year", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Fiscal year {}", fiscal_year.id)));
        }
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM fiscal_years WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete fiscal year", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Fiscal year {}", id)));
        }
        Ok(())
    }
}
