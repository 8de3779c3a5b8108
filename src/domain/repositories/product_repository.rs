use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::product::{Product, ProductCategory, ProductFilter};
use crate::domain::shared::Page;

/// Repository trait for the Product aggregate
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> RepositoryResult<()>;

    async fn update(&self, product: &Product) -> RepositoryResult<()>;

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Product>>;

    async fn find_by_reference(
        &self,
        organization_id: Uuid,
        reference: &str,
    ) -> RepositoryResult<Option<Product>>;

    async fn list(
        &self,
        organization_id: Uuid,
        filter: &ProductFilter,
    ) -> RepositoryResult<Page<Product>>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}

/// Repository trait for product categories
#[async_trait]
pub trait ProductCategoryRepository: Send + Sync {
    /// Sorted by name
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<ProductCategory>>;

    async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<ProductCategory>>;

    /// Case-insensitive lookup
    async fn find_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> RepositoryResult<Option<ProductCategory>>;

    async fn create(&self, category: &ProductCategory) -> RepositoryResult<()>;

    async fn update(&self, category: &ProductCategory) -> RepositoryResult<()>;

    /// Delete a category; its products keep existing without a category
    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}
