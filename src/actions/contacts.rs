use uuid::Uuid;

use super::{authorize, ensure_party, Session};
use crate::api::errors::ApiError;
use crate::domain::address::PartyRef;
use crate::domain::contact::{Contact, ContactInput};
use crate::domain::member::Permission;
use crate::infrastructure::cache::tags;
use crate::state::AppState;

#[tracing::instrument(skip(state))]
pub async fn get_contacts(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
) -> Result<Vec<Contact>, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    ensure_party(state, organization_id, owner).await?;
    state
        .cache
        .cached(
            format!("contacts:{}", owner),
            vec![tags::party(owner)],
            || async move {
                state
                    .repositories
                    .contacts
                    .list(owner)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

#[tracing::instrument(skip(state, input))]
pub async fn create_contact(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    input: ContactInput,
) -> Result<Contact, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;

    let contact = Contact::new(owner, fields);
    state.repositories.contacts.create(&contact).await?;

    state.cache.invalidate(&[tags::party(owner)]).await;
    tracing::info!(contact_id = %contact.id, %owner, "Contact created");
    Ok(contact)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_contact(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    id: Uuid,
    input: ContactInput,
) -> Result<Contact, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;

    let mut contact = find(state, owner, id).await?;
    contact.apply(fields);
    state.repositories.contacts.update(&contact).await?;

    state.cache.invalidate(&[tags::party(owner)]).await;
    tracing::info!(contact_id = %id, %owner, "Contact updated");
    Ok(contact)
}

#[tracing::instrument(skip(state))]
pub async fn delete_contact(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    owner: PartyRef,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_party(state, organization_id, owner).await?;
    find(state, owner, id).await?;
    state.repositories.contacts.delete(owner, id).await?;

    state.cache.invalidate(&[tags::party(owner)]).await;
    tracing::info!(contact_id = %id, %owner, "Contact deleted");
    Ok(())
}

async fn find(state: &AppState, owner: PartyRef, id: Uuid) -> Result<Contact, ApiError> {
    state
        .repositories
        .contacts
        .find_by_id(owner, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact introuvable"))
}
