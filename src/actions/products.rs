use uuid::Uuid;

use super::{authorize, list_key, Session};
use crate::api::errors::ApiError;
use crate::domain::member::Permission;
use crate::domain::product::{Product, ProductFields, ProductInput, ProductListQuery};
use crate::domain::shared::{FieldErrors, Page, StatusInput};
use crate::infrastructure::cache::tags;
use crate::state::AppState;

#[tracing::instrument(skip(state, query))]
pub async fn get_products(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    query: ProductListQuery,
) -> Result<Page<Product>, ApiError> {
    let filter = query.validate()?;
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            list_key("products", organization_id, &filter),
            vec![tags::products(organization_id)],
            || async {
                state
                    .repositories
                    .products
                    .list(organization_id, &filter)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

/// Cached under the product tag and the list tag, since category deletions
/// only invalidate the latter
#[tracing::instrument(skip(state))]
pub async fn get_product(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<Product, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            format!("product:{}:{}", organization_id, id),
            vec![tags::product(id), tags::products(organization_id)],
            || find(state, organization_id, id),
        )
        .await
}

async fn find(state: &AppState, organization_id: Uuid, id: Uuid) -> Result<Product, ApiError> {
    state
        .repositories
        .products
        .find_by_id(organization_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Produit introuvable"))
}

/// Category must belong to the organization; reference must be unused
async fn check_fields(
    state: &AppState,
    organization_id: Uuid,
    fields: &ProductFields,
    current: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(category_id) = fields.category_id {
        state
            .repositories
            .categories
            .find_by_id(organization_id, category_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Catégorie introuvable"))?;
    }
    let taken = state
        .repositories
        .products
        .find_by_reference(organization_id, &fields.reference)
        .await?
        .is_some_and(|other| Some(other.id) != current);
    if taken {
        return Err(ApiError::conflict(
            "Un produit existe déjà avec cette référence",
        ));
    }
    Ok(())
}

#[tracing::instrument(skip(state, input))]
pub async fn create_product(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    input: ProductInput,
) -> Result<Product, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    check_fields(state, organization_id, &fields, None).await?;

    let product = Product::new(organization_id, fields);
    state.repositories.products.create(&product).await?;

    invalidate(state, organization_id, product.id).await;
    tracing::info!(product_id = %product.id, reference = %product.reference, "Product created");
    Ok(product)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_product(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: ProductInput,
) -> Result<Product, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut product = find(state, organization_id, id).await?;
    check_fields(state, organization_id, &fields, Some(id)).await?;

    product.apply(fields);
    state.repositories.products.update(&product).await?;

    invalidate(state, organization_id, id).await;
    tracing::info!(product_id = %id, "Product updated");
    Ok(product)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_product_status(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: StatusInput,
) -> Result<Product, ApiError> {
    let status = input
        .status
        .ok_or_else(|| FieldErrors::single("status", "Le statut est requis"))?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut product = find(state, organization_id, id).await?;

    if product.change_status(status).map_err(ApiError::conflict)? {
        state.repositories.products.update(&product).await?;
        invalidate(state, organization_id, id).await;
        tracing::info!(product_id = %id, status = %status, "Product status changed");
    }
    Ok(product)
}

#[tracing::instrument(skip(state))]
pub async fn delete_product(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    state.repositories.products.delete(organization_id, id).await?;

    invalidate(state, organization_id, id).await;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(())
}

async fn invalidate(state: &AppState, organization_id: Uuid, id: Uuid) {
    state
        .cache
        .invalidate(&[tags::products(organization_id), tags::product(id)])
        .await;
}
