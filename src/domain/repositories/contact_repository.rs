use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::address::PartyRef;
use crate::domain::contact::Contact;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Sorted by last name, then first name
    async fn list(&self, owner: PartyRef) -> RepositoryResult<Vec<Contact>>;

    async fn find_by_id(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Contact>>;

    async fn create(&self, contact: &Contact) -> RepositoryResult<()>;

    async fn update(&self, contact: &Contact) -> RepositoryResult<()>;

    async fn delete(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<()>;
}
