use uuid::Uuid;

use super::{authorize, Session};
use crate::api::errors::ApiError;
use crate::domain::member::{Member, MemberInput, MemberWithUser, Permission, Role, RoleInput};
use crate::infrastructure::cache::tags;
use crate::state::AppState;

const OWNER_ONLY: &str = "Seul un propriétaire peut gérer les propriétaires";

#[tracing::instrument(skip(state))]
pub async fn get_members(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
) -> Result<Vec<MemberWithUser>, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            format!("members:{}", organization_id),
            vec![tags::members(organization_id)],
            || async move {
                state
                    .repositories
                    .members
                    .list(organization_id)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

/// Adds an existing user to the organization
#[tracing::instrument(skip(state, input))]
pub async fn create_member(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    input: MemberInput,
) -> Result<MemberWithUser, ApiError> {
    let new_member = input.validate()?;
    let actor = authorize(state, session, organization_id, Permission::ManageMembers).await?;
    if new_member.role == Role::Owner && !actor.is_owner() {
        return Err(ApiError::forbidden(OWNER_ONLY));
    }

    let user = state
        .repositories
        .users
        .find_by_email(&new_member.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Aucun utilisateur avec cet email"))?;

    if state
        .repositories
        .members
        .find_membership(organization_id, user.id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(
            "Cet utilisateur est déjà membre de l'organisation",
        ));
    }

    let member = Member::new(organization_id, user.id, new_member.role);
    state.repositories.members.create(&member).await?;

    invalidate(state, organization_id, user.id).await;
    tracing::info!(member_id = %member.id, role = %member.role, "Member added");
    Ok(MemberWithUser {
        id: member.id,
        organization_id,
        user_id: user.id,
        role: member.role,
        email: user.email.as_str().to_string(),
        full_name: user.full_name,
        created_at: member.created_at,
    })
}

#[tracing::instrument(skip(state, input))]
pub async fn update_member_role(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    member_id: Uuid,
    input: RoleInput,
) -> Result<Member, ApiError> {
    let role = input.validate()?;
    let actor = authorize(state, session, organization_id, Permission::ManageMembers).await?;
    let mut target = find(state, organization_id, member_id).await?;

    if (target.is_owner() || role == Role::Owner) && !actor.is_owner() {
        return Err(ApiError::forbidden(OWNER_ONLY));
    }
    if target.role == role {
        return Ok(target);
    }
    state
        .repositories
        .members
        .update_role(organization_id, target.id, role)
        .await?;
    target.role = role;

    invalidate(state, organization_id, target.user_id).await;
    tracing::info!(member_id = %target.id, role = %role, "Member role changed");
    Ok(target)
}

/// Removes a member; any member may remove themself
#[tracing::instrument(skip(state))]
pub async fn delete_member(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    member_id: Uuid,
) -> Result<(), ApiError> {
    let actor = authorize(state, session, organization_id, Permission::ReadData).await?;
    let target = find(state, organization_id, member_id).await?;

    let leaving = target.user_id == session.user_id;
    if !leaving && !actor.can(Permission::ManageMembers) {
        return Err(ApiError::forbidden(
            "Vous n'avez pas les droits nécessaires pour cette action",
        ));
    }
    if target.is_owner() && !actor.is_owner() {
        return Err(ApiError::forbidden(OWNER_ONLY));
    }
    state
        .repositories
        .members
        .delete(organization_id, target.id)
        .await?;

    invalidate(state, organization_id, target.user_id).await;
    tracing::info!(member_id = %target.id, leaving, "Member removed");
    Ok(())
}

async fn find(state: &AppState, organization_id: Uuid, member_id: Uuid) -> Result<Member, ApiError> {
    state
        .repositories
        .members
        .find_by_id(organization_id, member_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Membre introuvable"))
}

async fn invalidate(state: &AppState, organization_id: Uuid, user_id: Uuid) {
    state
        .cache
        .invalidate(&[
            tags::members(organization_id),
            tags::user_organizations(user_id),
        ])
        .await;
}
