use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::client::{Client, ClientFilter};
use crate::domain::shared::Page;

/// Repository trait for the Client aggregate
///
/// Every lookup is scoped to an organization.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: &Client) -> RepositoryResult<()>;

    async fn update(&self, client: &Client) -> RepositoryResult<()>;

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Client>>;

    async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> RepositoryResult<Option<Client>>;

    async fn find_by_siret(
        &self,
        organization_id: Uuid,
        siret: &str,
    ) -> RepositoryResult<Option<Client>>;

    /// Filtered, sorted, paginated listing
    async fn list(&self, organization_id: Uuid, filter: &ClientFilter) -> RepositoryResult<Page<Client>>;

    /// Delete a client with its addresses and contacts
    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}
