// Addresses nested under a client or a supplier; `P` picks which

use axum::extract::State;
use uuid::Uuid;

use super::Party;
use crate::actions::addresses::{self, AddressDeletion};
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::address::{Address, AddressInput};
use crate::state::AppState;

/// GET .../:party_id/addresses
pub async fn list<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<Vec<Address>> {
    let owner = P::reference(party_id);
    Ok(Success::ok(
        addresses::get_addresses(&state, &session, org_id, owner).await?,
    ))
}

/// POST .../:party_id/addresses
pub async fn create<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<AddressInput>,
) -> ApiResult<Address> {
    let owner = P::reference(party_id);
    let address = addresses::create_address(&state, &session, org_id, owner, input).await?;
    Ok(Success::created(address).with_message("Adresse ajoutée"))
}

/// PUT .../:party_id/addresses/:address_id
pub async fn update<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id, id)): Ids<(Uuid, Uuid, Uuid)>,
    Payload(input): Payload<AddressInput>,
) -> ApiResult<Address> {
    let owner = P::reference(party_id);
    let address = addresses::update_address(&state, &session, org_id, owner, id, input).await?;
    Ok(Success::ok(address).with_message("Adresse mise à jour"))
}

/// PUT .../:party_id/addresses/:address_id/default
pub async fn set_default<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id, id)): Ids<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Address> {
    let owner = P::reference(party_id);
    let address = addresses::set_default_address(&state, &session, org_id, owner, id).await?;
    Ok(Success::ok(address).with_message("Adresse par défaut modifiée"))
}

/// DELETE .../:party_id/addresses/:address_id
pub async fn delete<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id, id)): Ids<(Uuid, Uuid, Uuid)>,
) -> ApiResult<AddressDeletion> {
    let owner = P::reference(party_id);
    let deletion = addresses::delete_address(&state, &session, org_id, owner, id).await?;
    Ok(Success::ok(deletion).with_message("Adresse supprimée"))
}
