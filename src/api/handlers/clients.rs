use axum::extract::State;
use uuid::Uuid;

use crate::actions::clients;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Filters, Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::client::{Client, ClientInput, ClientListQuery};
use crate::domain::shared::{Page, StatusInput};
use crate::state::AppState;

/// Search, filter, sort and paginate clients
///
/// GET /api/organizations/:org_id/clients?search=&status=&kind=&sort=&direction=&page=&per_page=
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Filters(query): Filters<ClientListQuery>,
) -> ApiResult<Page<Client>> {
    Ok(Success::ok(
        clients::get_clients(&state, &session, org_id, query).await?,
    ))
}

/// GET /api/organizations/:org_id/clients/:client_id
pub async fn get(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<Client> {
    Ok(Success::ok(
        clients::get_client(&state, &session, org_id, id).await?,
    ))
}

/// POST /api/organizations/:org_id/clients
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Payload(input): Payload<ClientInput>,
) -> ApiResult<Client> {
    let client = clients::create_client(&state, &session, org_id, input).await?;
    Ok(Success::created(client).with_message("Client créé"))
}

/// PUT /api/organizations/:org_id/clients/:client_id
pub async fn update(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<ClientInput>,
) -> ApiResult<Client> {
    let client = clients::update_client(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(client).with_message("Client mis à jour"))
}

/// PATCH /api/organizations/:org_id/clients/:client_id/status
pub async fn update_status(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<StatusInput>,
) -> ApiResult<Client> {
    let client = clients::update_client_status(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(client).with_message("Statut mis à jour"))
}

/// DELETE /api/organizations/:org_id/clients/:client_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<()> {
    clients::delete_client(&state, &session, org_id, id).await?;
    Ok(Success::done("Client supprimé"))
}
