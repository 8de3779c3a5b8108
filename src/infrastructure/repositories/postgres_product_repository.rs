use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::product::{Product, ProductCategory, ProductFilter, ProductSort};
use crate::domain::repositories::{
    ProductCategoryRepository, ProductRepository, RepositoryError, RepositoryResult,
};
use crate::domain::shared::Page;
use crate::infrastructure::database::{like_pattern, map_sqlx_error};

/// PostgreSQL implementation of ProductRepository and ProductCategoryRepository
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str = "id, organization_id, category_id, reference, name, description, \
     kind, unit, unit_price, vat_rate, status, created_at, updated_at";

fn push_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    organization_id: Uuid,
    filter: &ProductFilter,
) {
    builder
        .push(" WHERE organization_id = ")
        .push_bind(organization_id);
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(kind) = filter.kind {
        builder.push(" AND kind = ").push_bind(kind);
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR reference ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn sort_column(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Name => "lower(name)",
        ProductSort::Reference => "reference",
        ProductSort::UnitPrice => "unit_price",
        ProductSort::CreatedAt => "created_at",
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: &Product) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, organization_id, category_id, reference, name, description, kind,
                unit, unit_price, vat_rate, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(product.id)
        .bind(product.organization_id)
        .bind(product.category_id)
        .bind(&product.reference)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.kind)
        .bind(product.unit)
        .bind(product.unit_price)
        .bind(product.vat_rate)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create product", e))?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET category_id = $3, reference = $4, name = $5, description = $6, kind = $7,
                unit = $8, unit_price = $9, vat_rate = $10, status = $11, updated_at = $12
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(product.organization_id)
        .bind(product.id)
        .bind(product.category_id)
        .bind(&product.reference)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.kind)
        .bind(product.unit)
        .bind(product.unit_price)
        .bind(product.vat_rate)
        .bind(product.status)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update product", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Product {}", product.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Product>> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE organization_id = $1 AND id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find product by id", e))
    }

    async fn find_by_reference(
        &self,
        organization_id: Uuid,
        reference: &str,
    ) -> RepositoryResult<Option<Product>> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE organization_id = $1 AND reference = $2",
            PRODUCT_COLUMNS
        ))
        .bind(organization_id)
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find product by reference", e))
    }

    async fn list(
        &self,
        organization_id: Uuid,
        filter: &ProductFilter,
    ) -> RepositoryResult<Page<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filter(&mut count, organization_id, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count products", e))?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
        push_filter(&mut select, organization_id, filter);
        select
            .push(format!(
                " ORDER BY {} {}, id",
                sort_column(filter.sort),
                filter.direction.as_sql()
            ))
            .push(" LIMIT ")
            .push_bind(filter.page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(filter.page.offset() as i64);

        let items = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list products", e))?;

        Ok(Page::new(items, total.max(0) as u64, filter.page))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete product", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Product {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCategoryRepository for PostgresProductRepository {
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<ProductCategory>> {
        sqlx::query_as::<_, ProductCategory>(
            r#"
            SELECT id, organization_id, name, description, created_at
            FROM product_categories
            WHERE organization_id = $1
            ORDER BY lower(name), id
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list product categories", e))
    }

    async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<ProductCategory>> {
        sqlx::query_as::<_, ProductCategory>(
            r#"
            SELECT id, organization_id, name, description, created_at
            FROM product_categories
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find product category by id", e))
    }

    async fn find_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> RepositoryResult<Option<ProductCategory>> {
        sqlx::query_as::<_, ProductCategory>(
            r#"
            SELECT id, organization_id, name, description, created_at
            FROM product_categories
            WHERE organization_id = $1 AND lower(name) = lower($2)
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find product category by name", e))
    }

    async fn create(&self, category: &ProductCategory) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO product_categories (id, organization_id, name, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(category.id)
        .bind(category.organization_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create product category", e))?;

        Ok(())
    }

    async fn update(&self, category: &ProductCategory) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_categories
            SET name = $3, description = $4
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(category.organization_id)
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update product category", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Product category {}", category.id)));
        }
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result =
            sqlx::query("DELETE FROM product_categories WHERE organization_id = $1 AND id = $2")
                .bind(organization_id)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to delete product category", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Product category {}", id)));
        }
        Ok(())
    }
}
