use uuid::Uuid;

use super::{authorize, Session};
use crate::api::errors::ApiError;
use crate::domain::member::{Member, Permission, Role};
use crate::domain::organization::{Organization, OrganizationInput, OrganizationMembership};
use crate::infrastructure::cache::tags;
use crate::state::AppState;

/// Organizations the session user belongs to, with their role
#[tracing::instrument(skip(state))]
pub async fn get_organizations(
    state: &AppState,
    session: &Session,
) -> Result<Vec<OrganizationMembership>, ApiError> {
    let user_id = session.user_id;
    state
        .cache
        .cached(
            format!("organizations:user:{}", user_id),
            vec![tags::user_organizations(user_id)],
            || async move {
                state
                    .repositories
                    .organizations
                    .list_for_user(user_id)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

#[tracing::instrument(skip(state))]
pub async fn get_organization(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> Result<OrganizationMembership, ApiError> {
    let member = authorize(state, session, id, Permission::ReadData).await?;
    let organization = state
        .cache
        .cached(
            format!("organization:{}", id),
            vec![tags::organization(id)],
            || load(state, id),
        )
        .await?;
    Ok(OrganizationMembership {
        organization,
        role: member.role,
    })
}

async fn load(state: &AppState, id: Uuid) -> Result<Organization, ApiError> {
    state
        .repositories
        .organizations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organisation introuvable"))
}

async fn ensure_siret_free(
    state: &AppState,
    siret: Option<&str>,
    current: Option<Uuid>,
) -> Result<(), ApiError> {
    let Some(siret) = siret else {
        return Ok(());
    };
    let taken = state
        .repositories
        .organizations
        .find_by_siret(siret)
        .await?
        .is_some_and(|other| Some(other.id) != current);
    if taken {
        return Err(ApiError::conflict("Une organisation existe déjà avec ce SIRET"));
    }
    Ok(())
}

/// Creates an organization; the creator becomes its owner
#[tracing::instrument(skip(state, input))]
pub async fn create_organization(
    state: &AppState,
    session: &Session,
    input: OrganizationInput,
) -> Result<OrganizationMembership, ApiError> {
    let fields = input.validate()?;
    ensure_siret_free(state, fields.siret.as_deref(), None).await?;

    let organization = Organization::new(fields, session.user_id);
    let owner = Member::new(organization.id, session.user_id, Role::Owner);
    state
        .repositories
        .organizations
        .create(&organization, &owner)
        .await?;

    state
        .cache
        .invalidate(&[tags::user_organizations(session.user_id)])
        .await;
    tracing::info!(organization_id = %organization.id, "Organization created");
    Ok(OrganizationMembership {
        organization,
        role: Role::Owner,
    })
}

#[tracing::instrument(skip(state, input))]
pub async fn update_organization(
    state: &AppState,
    session: &Session,
    id: Uuid,
    input: OrganizationInput,
) -> Result<Organization, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, id, Permission::ManageOrganization).await?;

    let mut organization = load(state, id).await?;
    ensure_siret_free(state, fields.siret.as_deref(), Some(id)).await?;
    organization.apply(fields);
    state.repositories.organizations.update(&organization).await?;

    let mut invalidated = vec![tags::organization(id)];
    invalidated.extend(member_tags(state, id).await?);
    state.cache.invalidate(&invalidated).await;
    tracing::info!(organization_id = %id, "Organization updated");
    Ok(organization)
}

/// Deletes an organization and everything it owns
#[tracing::instrument(skip(state))]
pub async fn delete_organization(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, id, Permission::DeleteOrganization).await?;

    // collected before the memberships disappear
    let mut invalidated = member_tags(state, id).await?;
    state.repositories.organizations.delete(id).await?;

    invalidated.extend([
        tags::organization(id),
        tags::members(id),
        tags::clients(id),
        tags::suppliers(id),
        tags::products(id),
        tags::product_categories(id),
        tags::fiscal_years(id),
    ]);
    state.cache.invalidate(&invalidated).await;
    tracing::info!(organization_id = %id, "Organization deleted");
    Ok(())
}

/// Organization-list tags of every member
async fn member_tags(state: &AppState, organization_id: Uuid) -> Result<Vec<String>, ApiError> {
    Ok(state
        .repositories
        .members
        .list_user_ids(organization_id)
        .await?
        .into_iter()
        .map(tags::user_organizations)
        .collect())
}
