use async_trait::async_trait;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::address::{Address, PartyRef};

/// Repository trait for addresses
///
/// Implementations keep the default-address invariant atomically: every
/// method that touches `is_default` runs as a single transaction.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Default first, then newest first
    async fn list(&self, owner: PartyRef) -> RepositoryResult<Vec<Address>>;

    async fn find_by_id(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Address>>;

    /// Insert an address and return it as stored
    ///
    /// The owner's first address becomes default whatever was requested; a
    /// default address clears the previous one.
    async fn create(&self, address: &Address) -> RepositoryResult<Address>;

    /// Save an edit and return the address as stored
    ///
    /// A default address clears the previous one. A stored default is never
    /// cleared by an edit, so a stale copy cannot leave the owner without one.
    async fn update(&self, address: &Address) -> RepositoryResult<Address>;

    /// Make one address the owner's default
    async fn set_default(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<()>;

    /// Delete an address; if it was the default, the newest remaining
    /// address becomes default. Returns the id of the new default, if any.
    async fn delete(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Uuid>>;
}
