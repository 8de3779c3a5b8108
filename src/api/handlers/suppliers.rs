use axum::extract::State;
use uuid::Uuid;

use crate::actions::suppliers;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Filters, Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::supplier::{Supplier, SupplierInput, SupplierListQuery};
use crate::domain::shared::{Page, StatusInput};
use crate::state::AppState;

/// Search, filter, sort and paginate suppliers
///
/// GET /api/organizations/:org_id/suppliers?search=&status=&sort=&direction=&page=&per_page=
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Filters(query): Filters<SupplierListQuery>,
) -> ApiResult<Page<Supplier>> {
    Ok(Success::ok(
        suppliers::get_suppliers(&state, &session, org_id, query).await?,
    ))
}

/// GET /api/organizations/:org_id/suppliers/:supplier_id
pub async fn get(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<Supplier> {
    Ok(Success::ok(
        suppliers::get_supplier(&state, &session, org_id, id).await?,
    ))
}

/// POST /api/organizations/:org_id/suppliers
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Payload(input): Payload<SupplierInput>,
) -> ApiResult<Supplier> {
    let supplier = suppliers::create_supplier(&state, &session, org_id, input).await?;
    Ok(Success::created(supplier).with_message("Supplier créé"))
}

/// PUT /api/organizations/:org_id/suppliers/:supplier_id
pub async fn update(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<SupplierInput>,
) -> ApiResult<Supplier> {
    let supplier = suppliers::update_supplier(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(supplier).with_message("Supplier mis à jour"))
}

/// PATCH /api/organizations/:org_id/suppliers/:supplier_id/status
pub async fn update_status(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<StatusInput>,
) -> ApiResult<Supplier> {
    let supplier = suppliers::update_supplier_status(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(supplier).with_message("Statut mis à jour"))
}

/// DELETE /api/organizations/:org_id/suppliers/:supplier_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<()> {
    suppliers::delete_supplier(&state, &session, org_id, id).await?;
    Ok(Success::done("Supplier supprimé"))
}
