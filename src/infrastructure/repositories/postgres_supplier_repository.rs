use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::repositories::{RepositoryError, RepositoryResult, SupplierRepository};
use crate::domain::shared::Page;
use crate::domain::supplier::{Supplier, SupplierFilter, SupplierSort};
use crate::infrastructure::database::{like_pattern, map_sqlx_error};

/// PostgreSQL implementation of SupplierRepository
pub struct PostgresSupplierRepository {
    pool: PgPool,
}

impl PostgresSupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SUPPLIER_COLUMNS: &str = "id, organization_id, name, email, phone, siret, vat_number, \
     website, notes, status, created_at, updated_at";

fn push_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    organization_id: Uuid,
    filter: &SupplierFilter,
) {
    builder
        .push(" WHERE organization_id = ")
        .push_bind(organization_id);
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl SupplierRepository for PostgresSupplierRepository {
    async fn create(&self, supplier: &Supplier) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, organization_id, name, email, phone, siret, vat_number,
                website, notes, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(supplier.id)
        .bind(supplier.organization_id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.siret)
        .bind(&supplier.vat_number)
        .bind(&supplier.website)
        .bind(&supplier.notes)
        .bind(supplier.status)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create supplier", e))?;

        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $3, email = $4, phone = $5, siret = $6, vat_number = $7,
                website = $8, notes = $9, status = $10, updated_at = $11
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(supplier.organization_id)
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.siret)
        .bind(&supplier.vat_number)
        .bind(&supplier.website)
        .bind(&supplier.notes)
        .bind(supplier.status)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update supplier", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Supplier {}", supplier.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Supplier>> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE organization_id = $1 AND id = $2",
            SUPPLIER_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find supplier by id", e))
    }

    async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> RepositoryResult<Option<Supplier>> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE organization_id = $1 AND lower(email) = lower($2)",
            SUPPLIER_COLUMNS
        ))
        .bind(organization_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find supplier by email", e))
    }

    async fn find_by_siret(
        &self,
        organization_id: Uuid,
        siret: &str,
    ) -> RepositoryResult<Option<Supplier>> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE organization_id = $1 AND siret = $2",
            SUPPLIER_COLUMNS
        ))
        .bind(organization_id)
        .bind(siret)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find supplier by siret", e))
    }

    async fn list(
        &self,
        organization_id: Uuid,
        filter: &SupplierFilter,
    ) -> RepositoryResult<Page<Supplier>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM suppliers");
        push_filter(&mut count, organization_id, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count suppliers", e))?;

        let sort = match filter.sort {
            SupplierSort::Name => "lower(name)",
            SupplierSort::CreatedAt => "created_at",
        };
        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM suppliers", SUPPLIER_COLUMNS));
        push_filter(&mut select, organization_id, filter);
        select
            .push(format!(" ORDER BY {} {}, id", sort, filter.direction.as_sql()))
            .push(" LIMIT ")
            .push_bind(filter.page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(filter.page.offset() as i64);

        let items = select
            .build_query_as::<Supplier>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list suppliers", e))?;

        Ok(Page::new(items, total.max(0) as u64, filter.page))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete supplier", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Supplier {}", id)));
        }
        Ok(())
    }
}
