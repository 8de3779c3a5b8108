use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{authorize, ensure_party, Session};
use crate::api::errors::ApiError;
use crate::domain::address::{Address, AddressInput, PartyRef};
use crate::domain::member::Permission;
use crate::infrastructure::cache::tags;
use crate::state::AppState;

/// Outcome of an address deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDeletion {
    /// Address promoted to default, when the deleted one was the default
    pub new_default_id: Option<Uuid>,
}

/// Default first, then newest first
#[tracing::instrument(skip(state))]
pub async fn get_addresses(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
) -> Result<Vec<Address>, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    ensure_party(state, organization_id, owner).await?;
    state
        .cache
        .cached(
            format!("addresses:{}", owner),
            vec![tags::party(owner)],
            || async move {
                state
                    .repositories
                    .addresses
                    .list(owner)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

/// The owner's first address is always its default
#[tracing::instrument(skip(state, input))]
pub async fn create_address(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    input: AddressInput,
) -> Result<Address, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;

    let address = state
        .repositories
        .addresses
        .create(&Address::new(owner, fields))
        .await?;

    invalidate(state, owner).await;
    tracing::info!(address_id = %address.id, %owner, is_default = address.is_default, "Address created");
    Ok(address)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_address(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    id: Uuid,
    input: AddressInput,
) -> Result<Address, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;
    let mut address = find(state, owner, id).await?;

    address.apply(fields);
    let address = state.repositories.addresses.update(&address).await?;

    invalidate(state, owner).await;
    tracing::info!(address_id = %id, %owner, "Address updated");
    Ok(address)
}

#[tracing::instrument(skip(state))]
pub async fn set_default_address(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    id: Uuid,
) -> Result<Address, ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;
    let mut address = find(state, owner, id).await?;

    if !address.is_default {
        state.repositories.addresses.set_default(owner, id).await?;
        address.is_default = true;
        invalidate(state, owner).await;
        tracing::info!(address_id = %id, %owner, "Default address changed");
    }
    Ok(address)
}

/// Deletes an address; the newest remaining one inherits the default flag
#[tracing::instrument(skip(state))]
pub async fn delete_address(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    id: Uuid,
) -> Result<AddressDeletion, ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;
    find(state, owner, id).await?;

    let new_default_id = state.repositories.addresses.delete(owner, id).await?;

    invalidate(state, owner).await;
    tracing::info!(address_id = %id, %owner, ?new_default_id, "Address deleted");
    Ok(AddressDeletion { new_default_id })
}

async fn find(state: &AppState, owner: PartyRef, id: Uuid) -> Result<Address, ApiError> {
    state
        .repositories
        .addresses
        .find_by_id(owner, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Adresse introuvable"))
}

async fn invalidate(state: &AppState, owner: PartyRef) {
    state.cache.invalidate(&[tags::party(owner)]).await;
}
