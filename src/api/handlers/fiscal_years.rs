use axum::extract::State;
use uuid::Uuid;

use crate::actions::fiscal_years;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::fiscal_year::{FiscalYear, FiscalYearInput, FiscalYearStatusInput};
use crate::state::AppState;

/// GET /api/organizations/:org_id/fiscal-years
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
) -> ApiResult<Vec<FiscalYear>> {
    Ok(Success::ok(
        fiscal_years::get_fiscal_years(&state, &session, org_id).await?,
    ))
}

/// GET /api/organizations/:org_id/fiscal-years/:fiscal_year_id
pub async fn get(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<FiscalYear> {
    Ok(Success::ok(
        fiscal_years::get_fiscal_year(&state, &session, org_id, id).await?,
    ))
}

/// POST /api/organizations/:org_id/fiscal-years
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Payload(input): Payload<FiscalYearInput>,
) -> ApiResult<FiscalYear> {
    let fiscal_year = fiscal_years::create_fiscal_year(&state, &session, org_id, input).await?;
    Ok(Success::created(fiscal_year).with_message("Exercice créé"))
}

/// PUT /api/organizations/:org_id/fiscal-years/:fiscal_year_id
pub async fn update(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<FiscalYearInput>,
) -> ApiResult<FiscalYear> {
    let fiscal_year =
        fiscal_years::update_fiscal_year(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(fiscal_year).with_message("Exercice mis à jour"))
}

/// Close, reopen or archive
///
/// PATCH /api/organizations/:org_id/fiscal-years/:fiscal_year_id/status
pub async fn update_status(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<FiscalYearStatusInput>,
) -> ApiResult<FiscalYear> {
    let fiscal_year =
        fiscal_years::update_fiscal_year_status(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(fiscal_year).with_message("Statut mis à jour"))
}

/// DELETE /api/organizations/:org_id/fiscal-years/:fiscal_year_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<()> {
    fiscal_years::delete_fiscal_year(&state, &session, org_id, id).await?;
    Ok(Success::done("Exercice supprimé"))
}
