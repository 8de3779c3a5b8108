use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::member::Member;
use crate::domain::organization::{Organization, OrganizationMembership};

/// Repository trait for the Organization aggregate
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert an organization together with its first (owner) member, atomically
    async fn create(&self, organization: &Organization, owner: &Member) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Organization>>;

    async fn find_by_siret(&self, siret: &str) -> RepositoryResult<Option<Organization>>;

    /// Organizations the user is a member of, with the user's role, by name
    async fn list_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<OrganizationMembership>>;

    async fn update(&self, organization: &Organization) -> RepositoryResult<()>;

    /// Delete an organization and everything it owns
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
