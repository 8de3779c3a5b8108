use uuid::Uuid;

use super::{authorize, Session};
use crate::api::errors::ApiError;
use crate::domain::fiscal_year::{
    FiscalYear, FiscalYearFields, FiscalYearInput, FiscalYearStatusInput,
};
use crate::domain::member::Permission;
use crate::domain::shared::FieldErrors;
use crate::infrastructure::cache::tags;
use crate::state::AppState;

/// Newest first
#[tracing::instrument(skip(state))]
pub async fn get_fiscal_years(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
) -> Result<Vec<FiscalYear>, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            format!("fiscal-years:{}", organization_id),
            vec![tags::fiscal_years(organization_id)],
            || async move {
                state
                    .repositories
                    .fiscal_years
                    .list(organization_id)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

#[tracing::instrument(skip(state))]
pub async fn get_fiscal_year(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<FiscalYear, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    find(state, organization_id, id).await
}

async fn find(state: &AppState, organization_id: Uuid, id: Uuid) -> Result<FiscalYear, ApiError> {
    state
        .repositories
        .fiscal_years
        .find_by_id(organization_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Exercice introuvable"))
}

async fn ensure_no_overlap(
    state: &AppState,
    organization_id: Uuid,
    fields: &FiscalYearFields,
    current: Option<Uuid>,
) -> Result<(), ApiError> {
    let overlapping = state
        .repositories
        .fiscal_years
        .find_overlapping(organization_id, fields.start_date, fields.end_date, current)
        .await?;
    match overlapping.first() {
        Some(other) => Err(ApiError::conflict(format!(
            "Les dates chevauchent l'exercice « {} »",
            other.name
        ))),
        None => Ok(()),
    }
}

#[tracing::instrument(skip(state, input))]
pub async fn create_fiscal_year(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    input: FiscalYearInput,
) -> Result<FiscalYear, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::ManageFiscalYears).await?;
    ensure_no_overlap(state, organization_id, &fields, None).await?;

    let fiscal_year = FiscalYear::new(organization_id, fields);
    state.repositories.fiscal_years.create(&fiscal_year).await?;

    invalidate(state, organization_id).await;
    tracing::info!(
        fiscal_year_id = %fiscal_year.id,
        start_date = %fiscal_year.start_date,
        end_date = %fiscal_year.end_date,
        "Fiscal year created"
    );
    Ok(fiscal_year)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_fiscal_year(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: FiscalYearInput,
) -> Result<FiscalYear, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::ManageFiscalYears).await?;
    let mut fiscal_year = find(state, organization_id, id).await?;
    ensure_no_overlap(state, organization_id, &fields, Some(id)).await?;

    fiscal_year.apply(fields).map_err(ApiError::conflict)?;
    state.repositories.fiscal_years.update(&fiscal_year).await?;

    invalidate(state, organization_id).await;
    tracing::info!(fiscal_year_id = %id, "Fiscal year updated");
    Ok(fiscal_year)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_fiscal_year_status(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: FiscalYearStatusInput,
) -> Result<FiscalYear, ApiError> {
    let status = input
        .status
        .ok_or_else(|| FieldErrors::single("status", "Le statut est requis"))?;
    authorize(state, session, organization_id, Permission::ManageFiscalYears).await?;
    let mut fiscal_year = find(state, organization_id, id).await?;

    if fiscal_year.change_status(status).map_err(ApiError::conflict)? {
        state.repositories.fiscal_years.update(&fiscal_year).await?;
        invalidate(state, organization_id).await;
        tracing::info!(fiscal_year_id = %id, status = %status, "Fiscal year status changed");
    }
    Ok(fiscal_year)
}

/// Only open fiscal years can be deleted
#[tracing::instrument(skip(state))]
pub async fn delete_fiscal_year(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, organization_id, Permission::ManageFiscalYears).await?;
    let fiscal_year = find(state, organization_id, id).await?;
    if !fiscal_year.can_be_deleted() {
        return Err(ApiError::conflict(format!(
            "Un exercice {} ne peut pas être supprimé",
            fiscal_year.status
        )));
    }

    state.repositories.fiscal_years.delete(organization_id, id).await?;

    invalidate(state, organization_id).await;
    tracing::info!(fiscal_year_id = %id, "Fiscal year deleted");
    Ok(())
}

async fn invalidate(state: &AppState, organization_id: Uuid) {
    state
        .cache
        .invalidate(&[tags::fiscal_years(organization_id)])
        .await;
}
