use axum::extract::State;
use uuid::Uuid;

use super::Party;
use crate::actions::contacts;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::contact::{Contact, ContactInput};
use crate::state::AppState;

/// GET .../:party_id/contacts
pub async fn list<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<Vec<Contact>> {
    let owner = P::reference(party_id);
    Ok(Success::ok(
        contacts::get_contacts(&state, &session, org_id, owner).await?,
    ))
}

/// POST .../:party_id/contacts
pub async fn create<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<ContactInput>,
) -> ApiResult<Contact> {
    let owner = P::reference(party_id);
    let contact = contacts::create_contact(&state, &session, org_id, owner, input).await?;
    Ok(Success::created(contact).with_message("Contact ajouté"))
}

/// PUT .../:party_id/contacts/:contact_id
pub async fn update<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id, id)): Ids<(Uuid, Uuid, Uuid)>,
    Payload(input): Payload<ContactInput>,
) -> ApiResult<Contact> {
    let owner = P::reference(party_id);
    let contact = contacts::update_contact(&state, &session, org_id, owner, id, input).await?;
    Ok(Success::ok(contact).with_message("Contact mis à jour"))
}

/// DELETE .../:party_id/contacts/:contact_id
pub async fn delete<P: Party>(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, party_id, id)): Ids<(Uuid, Uuid, Uuid)>,
) -> ApiResult<()> {
    let owner = P::reference(party_id);
    contacts::delete_contact(&state, &session, org_id, owner, id).await?;
    Ok(Success::done("Contact supprimé"))
}
