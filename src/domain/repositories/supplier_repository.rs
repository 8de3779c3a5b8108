use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::shared::Page;
use crate::domain::supplier::{Supplier, SupplierFilter};

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn create(&self, supplier: &Supplier) -> RepositoryResult<()>;

    async fn update(&self, supplier: &Supplier) -> RepositoryResult<()>;

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Supplier>>;

    async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> RepositoryResult<Option<Supplier>>;

    async fn find_by_siret(
        &self,
        organization_id: Uuid,
        siret: &str,
    ) -> RepositoryResult<Option<Supplier>>;

    async fn list(
        &self,
        organization_id: Uuid,
        filter: &SupplierFilter,
    ) -> RepositoryResult<Page<Supplier>>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}
