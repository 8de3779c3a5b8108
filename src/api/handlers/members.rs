use axum::extract::State;
use uuid::Uuid;

use crate::actions::members;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::member::{Member, MemberInput, MemberWithUser, RoleInput};
use crate::state::AppState;

/// GET /api/organizations/:org_id/members
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
) -> ApiResult<Vec<MemberWithUser>> {
    Ok(Success::ok(
        members::get_members(&state, &session, org_id).await?,
    ))
}

/// Add an existing user by email
///
/// POST /api/organizations/:org_id/members
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Payload(input): Payload<MemberInput>,
) -> ApiResult<MemberWithUser> {
    let member = members::create_member(&state, &session, org_id, input).await?;
    Ok(Success::created(member).with_message("Membre ajouté"))
}

/// PUT /api/organizations/:org_id/members/:member_id
pub async fn update_role(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, member_id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<RoleInput>,
) -> ApiResult<Member> {
    let member = members::update_member_role(&state, &session, org_id, member_id, input).await?;
    Ok(Success::ok(member).with_message("Rôle mis à jour"))
}

/// DELETE /api/organizations/:org_id/members/:member_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, member_id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<()> {
    members::delete_member(&state, &session, org_id, member_id).await?;
    Ok(Success::done("Membre retiré"))
}
