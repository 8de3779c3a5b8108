use axum::extract::State;
use uuid::Uuid;

use crate::actions::organizations;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::organization::{Organization, OrganizationInput, OrganizationMembership};
use crate::state::AppState;

/// GET /api/organizations
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
) -> ApiResult<Vec<OrganizationMembership>> {
    Ok(Success::ok(
        organizations::get_organizations(&state, &session).await?,
    ))
}

/// GET /api/organizations/:org_id
pub async fn get(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(id): Ids<Uuid>,
) -> ApiResult<OrganizationMembership> {
    Ok(Success::ok(
        organizations::get_organization(&state, &session, id).await?,
    ))
}

/// Create an organization owned by the caller
///
/// POST /api/organizations
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Payload(input): Payload<OrganizationInput>,
) -> ApiResult<OrganizationMembership> {
    let created = organizations::create_organization(&state, &session, input).await?;
    Ok(Success::created(created).with_message("Organisation créée"))
}

/// PUT /api/organizations/:org_id
pub async fn update(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(id): Ids<Uuid>,
    Payload(input): Payload<OrganizationInput>,
) -> ApiResult<Organization> {
    let updated = organizations::update_organization(&state, &session, id, input).await?;
    Ok(Success::ok(updated).with_message("Organisation mise à jour"))
}

/// DELETE /api/organizations/:org_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(id): Ids<Uuid>,
) -> ApiResult<()> {
    organizations::delete_organization(&state, &session, id).await?;
    Ok(Success::done("Organisation supprimée"))
}
