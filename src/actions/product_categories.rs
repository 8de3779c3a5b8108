use uuid::Uuid;

use super::{authorize, Session};
use crate::api::errors::ApiError;
use crate::domain::member::Permission;
use crate::domain::product::{CategoryInput, ProductCategory};
use crate::infrastructure::cache::tags;
use crate::state::AppState;

#[tracing::instrument(skip(state))]
pub async fn get_product_categories(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
) -> Result<Vec<ProductCategory>, ApiError> {
    authorize(state, session, organization_id, Permission::ReadData).await?;
    state
        .cache
        .cached(
            format!("product-categories:{}", organization_id),
            vec![tags::product_categories(organization_id)],
            || async move {
                state
                    .repositories
                    .categories
                    .list(organization_id)
                    .await
                    .map_err(ApiError::from)
            },
        )
        .await
}

async fn find(
    state: &AppState,
    organization_id: Uuid,
    id: Uuid,
) -> Result<ProductCategory, ApiError> {
    state
        .repositories
        .categories
        .find_by_id(organization_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Catégorie introuvable"))
}

async fn ensure_name_free(
    state: &AppState,
    organization_id: Uuid,
    name: &str,
    current: Option<Uuid>,
) -> Result<(), ApiError> {
    let taken = state
        .repositories
        .categories
        .find_by_name(organization_id, name)
        .await?
        .is_some_and(|other| Some(other.id) != current);
    if taken {
        return Err(ApiError::conflict("Une catégorie existe déjà avec ce nom"));
    }
    Ok(())
}

#[tracing::instrument(skip(state, input))]
pub async fn create_product_category(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    input: CategoryInput,
) -> Result<ProductCategory, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    ensure_name_free(state, organization_id, &fields.name, None).await?;

    let category = ProductCategory::new(organization_id, fields);
    state.repositories.categories.create(&category).await?;

    state
        .cache
        .invalidate(&[tags::product_categories(organization_id)])
        .await;
    tracing::info!(category_id = %category.id, "Product category created");
    Ok(category)
}

#[tracing::instrument(skip(state, input))]
pub async fn update_product_category(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
    input: CategoryInput,
) -> Result<ProductCategory, ApiError> {
    let fields = input.validate()?;
    authorize(state, session, organization_id, Permission::WriteData).await?;
    let mut category = find(state, organization_id, id).await?;
    ensure_name_free(state, organization_id, &fields.name, Some(id)).await?;

    category.apply(fields);
    state.repositories.categories.update(&category).await?;

    state
        .cache
        .invalidate(&[tags::product_categories(organization_id)])
        .await;
    tracing::info!(category_id = %id, "Product category updated");
    Ok(category)
}

/// Deletes a category; its products are kept without a category
#[tracing::instrument(skip(state))]
pub async fn delete_product_category(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    id: Uuid,
) -> Result<(), ApiError> {
    authorize(state, session, organization_id, Permission::WriteData).await?;
    find(state, organization_id, id).await?;
    state.repositories.categories.delete(organization_id, id).await?;

    state
        .cache
        .invalidate(&[
            tags::product_categories(organization_id),
            tags::products(organization_id),
        ])
        .await;
    tracing::info!(category_id = %id, "Product category deleted");
    Ok(())
}
