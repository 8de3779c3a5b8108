use axum::extract::State;
use uuid::Uuid;

use crate::actions::product_categories;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::product::{CategoryInput, ProductCategory};
use crate::state::AppState;

/// GET /api/organizations/:org_id/product-categories
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
) -> ApiResult<Vec<ProductCategory>> {
    Ok(Success::ok(
        product_categories::get_product_categories(&state, &session, org_id).await?,
    ))
}

/// POST /api/organizations/:org_id/product-categories
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Payload(input): Payload<CategoryInput>,
) -> ApiResult<ProductCategory> {
    let category =
        product_categories::create_product_category(&state, &session, org_id, input).await?;
    Ok(Success::created(category).with_message("Catégorie créée"))
}

/// PUT /api/organizations/:org_id/product-categories/:category_id
pub async fn update(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<CategoryInput>,
) -> ApiResult<ProductCategory> {
    let category =
        product_categories::update_product_category(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(category).with_message("Catégorie mise à jour"))
}

/// DELETE /api/organizations/:org_id/product-categories/:category_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<()> {
    product_categories::delete_product_category(&state, &session, org_id, id).await?;
    Ok(Success::done("Catégorie supprimée"))
}
