use uuid::Uuid;

use super::{authorize, list_key, Session};
use crate::api::errors::ApiError;
use crate::domain::member::Permission;
use crate::domain::shared::{FieldErrors, Page, StatusInput};
use crate::domain::supplier::{Supplier, SupplierFields, SupplierInput, SupplierListQuery};
use crate::infrastructure::cache::tags;
use crate::state::AppState;

#[tracing::instrument(skip(state, query))]
pub async fn get_suppliers(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    query: SupplierListQuery,
) -> Result<Page<Supplier>, ApiError> {
    let filter = query.validate()?;
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            list_key("suppliers", organization_id, &filter),
            vec![tags::suppliers(organization_id)],
            || async {
                state
                    .repositories
                    .suppliers
                    .list(organization_id, &filter)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

#[tracing::instrument(skip(state))]
pub async fn get_supplier(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<Supplier, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            format!("supplier:{}:{}", organization_id, id),
            vec![tags::supplier(id)],
            || find(state, organization_id, id),
        )
        .await
}

async fn find(state: &AppState, organization_id: Uuid, id: Uuid) -> Result<Supplier, ApiError> {
    state
        .repositories
        .suppliers
        .find_by_id(organization_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Fournisseur introuvable"))
}

/// Email and SIRET are unique among the organization's suppliers
async fn ensure_unique(
    state: &AppState,
    organization_id: Uuid,
    fields: &SupplierFields,
    current: Option<Uuid>,
) -> Result<(), ApiError> {
    let suppliers = &state.repositories.suppliers;
    if let Some(email) = &fields.email {
        if let Some(other) = suppliers.find_by_email(organization_id, email).await? {
            if Some(other.id) != current {
                return Err(ApiError::conflict("Un fournisseur existe déjà avec cet email"));
            }
        }
    }
    if let Some(siret) = &fields.siret {
        if let Some(other) = suppliers.find_by_siret(organization_id, siret).await? {
            if Some(other.id) != current {
                return Err(ApiError::conflict("Un fournisseur existe déjà avec ce SIRET"));
            }
        }
    }
    Ok(())
}

#[tracing::instrument(skip(state, input))]
pub async fn create_supplier(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    input: SupplierInput,
) -> Result<Supplier, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_unique(state, organization_id, &fields, None).await?;

    let supplier = Supplier::new(organization_id, fields);
    state.repositories.suppliers.create(&supplier).await?;

    invalidate(state, organization_id, supplier.id).await;
    tracing::info!(supplier_id = %supplier.id, "Supplier created");
    Ok(supplier)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_supplier(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: SupplierInput,
) -> Result<Supplier, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut supplier = find(state, organization_id, id).await?;
    ensure_unique(state, organization_id, &fields, Some(id)).await?;

    supplier.apply(fields);
    state.repositories.suppliers.update(&supplier).await?;

    invalidate(state, organization_id, id).await;
    tracing::info!(supplier_id = %id, "Supplier updated");
    Ok(supplier)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_supplier_status(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: StatusInput,
) -> Result<Supplier, ApiError> {
    let status = input
        .status
        .ok_or_else(|| FieldErrors::single("status", "Le statut est requis"))?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut supplier = find(state, organization_id, id).await?;

    if supplier.change_status(status).map_err(ApiError::conflict)? {
        state.repositories.suppliers.update(&supplier).await?;
        invalidate(state, organization_id, id).await;
        tracing::info!(supplier_id = %id, status = %status, "Supplier status changed");
    }
    Ok(supplier)
}

/// Deletes a supplier with its addresses and contacts
#[tracing::instrument(skip(state))]
pub async fn delete_supplier(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    state.repositories.suppliers.delete(organization_id, id).await?;

    invalidate(state, organization_id, id).await;
    tracing::info!(supplier_id = %id, "Supplier deleted");
    Ok(())
}

async fn invalidate(state: &AppState, organization_id: Uuid, id: Uuid) {
    state
        .cache
        .invalidate(&[tags::suppliers(organization_id), tags::supplier(id)])
        .await;
}
