use uuid::Uuid;

use super::{authorize, list_key, Session};
use crate::api::errors::ApiError;
use crate::domain::client::{Client, ClientFields, ClientInput, ClientListQuery};
use crate::domain::member::Permission;
use crate::domain::shared::{FieldErrors, Page, StatusInput};
use crate::infrastructure::cache::tags;
use crate::state::AppState;

#[tracing::instrument(skip(state, query))]
pub async fn get_clients(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    query: ClientListQuery,
) -> Result<Page<Client>, ApiError> {
    let filter = query.validate()?;
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            list_key("clients", organization_id, &filter),
            vec![tags::clients(organization_id)],
            || async {
                state
                    .repositories
                    .clients
                    .list(organization_id, &filter)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

#[tracing::instrument(skip(state))]
pub async fn get_client(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<Client, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            format!("client:{}:{}", organization_id, id),
            vec![tags::client(id)],
            || find(state, organization_id, id),
        )
        .await
}

async fn find(state: &AppState, organization_id: Uuid, id: Uuid) -> Result<Client, ApiError> {
    state
        .repositories
        .clients
        .find_by_id(organization_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client introuvable"))
}

/// Email and SIRET are unique among the organization's clients
async fn ensure_unique(
    state: &AppState,
    organization_id: Uuid,
    fields: &ClientFields,
    current: Option<Uuid>,
) -> Result<(), ApiError> {
    let clients = &state.repositories.clients;
    if let Some(email) = &fields.email {
        if let Some(other) = clients.find_by_email(organization_id, email).await? {
            if Some(other.id) != current {
                return Err(ApiError::conflict("Un client existe déjà avec cet email"));
            }
        }
    }
    if let Some(siret) = &fields.siret {
        if let Some(other) = clients.find_by_siret(organization_id, siret).await? {
            if Some(other.id) != current {
                return Err(ApiError::conflict("Un client existe déjà avec ce SIRET"));
            }
        }
    }
    Ok(())
}

#[tracing::instrument(skip(state, input))]
pub async fn create_client(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    input: ClientInput,
) -> Result<Client, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_unique(state, organization_id, &fields, None).await?;

    let client = Client::new(organization_id, fields);
    state.repositories.clients.create(&client).await?;

    invalidate(state, organization_id, client.id).await;
    tracing::info!(client_id = %client.id, "Client created");
    Ok(client)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_client(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: ClientInput,
) -> Result<Client, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut client = find(state, organization_id, id).await?;
    ensure_unique(state, organization_id, &fields, Some(id)).await?;

    client.apply(fields);
    state.repositories.clients.update(&client).await?;

    invalidate(state, organization_id, id).await;
    tracing::info!(client_id = %id, "Client updated");
    Ok(client)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_client_status(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: StatusInput,
) -> Result<Client, ApiError> {
    let status = input
        .status
        .ok_or_else(|| FieldErrors::single("status", "Le statut est requis"))?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut client = find(state, organization_id, id).await?;

    if client.change_status(status).map_err(ApiError::conflict)? {
        state.repositories.clients.update(&client).await?;
        invalidate(state, organization_id, id).await;
        tracing::info!(client_id = %id, status = %status, "Client status changed");
    }
    Ok(client)
}

/// Deletes a client with its addresses and contacts
#[tracing::instrument(skip(state))]
pub async fn delete_client(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    state.repositories.clients.delete(organization_id, id).await?;

    invalidate(state, organization_id, id).await;
    tracing::info!(client_id = %id, "Client deleted");
    Ok(())
}

async fn invalidate(state: &AppState, organization_id: Uuid, id: Uuid) {
    state
        .cache
        .invalidate(&[tags::clients(organization_id), tags::client(id)])
        .await;
}
