use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::member::{Member, MemberWithUser, Role};

/// Conflict key reported when a change would leave an organization without an owner
pub const LAST_OWNER: &str = "members_last_owner";

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// The user's membership in an organization, if any
    async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RepositoryResult<Option<Member>>;

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Member>>;

    /// Members with their user identity, owners first then by name
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<MemberWithUser>>;

    /// User ids of every member; used to invalidate their organization lists
    async fn list_user_ids(&self, organization_id: Uuid) -> RepositoryResult<Vec<Uuid>>;

    /// A user already in the organization is a `Conflict`
    async fn create(&self, member: &Member) -> RepositoryResult<()>;

    /// Change a role; demoting the last owner is a `Conflict(LAST_OWNER)`
    ///
    /// The owner check and the write are atomic.
    async fn update_role(&self, organization_id: Uuid, id: Uuid, role: Role) -> RepositoryResult<()>;

    /// Remove a member; removing the last owner is a `Conflict(LAST_OWNER)`
    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}
