use axum::extract::State;
use uuid::Uuid;

use crate::actions::products;
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::{Filters, Ids, Payload};
use crate::api::middleware::JwtAuth;
use crate::domain::product::{Product, ProductInput, ProductListQuery};
use crate::domain::shared::{Page, StatusInput};
use crate::state::AppState;

/// Search, filter, sort and paginate the catalogue
///
/// GET /api/organizations/:org_id/products?search=&status=&kind=&category_id=&sort=&direction=&page=&per_page=
pub async fn list(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Filters(query): Filters<ProductListQuery>,
) -> ApiResult<Page<Product>> {
    Ok(Success::ok(
        products::get_products(&state, &session, org_id, query).await?,
    ))
}

/// GET /api/organizations/:org_id/products/:product_id
pub async fn get(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<Product> {
    Ok(Success::ok(
        products::get_product(&state, &session, org_id, id).await?,
    ))
}

/// POST /api/organizations/:org_id/products
pub async fn create(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids(org_id): Ids<Uuid>,
    Payload(input): Payload<ProductInput>,
) -> ApiResult<Product> {
    let product = products::create_product(&state, &session, org_id, input).await?;
    Ok(Success::created(product).with_message("Product créé"))
}

/// PUT /api/organizations/:org_id/products/:product_id
pub async fn update(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<ProductInput>,
) -> ApiResult<Product> {
    let product = products::update_product(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(product).with_message("Product mis à jour"))
}

/// PATCH /api/organizations/:org_id/products/:product_id/status
pub async fn update_status(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
    Payload(input): Payload<StatusInput>,
) -> ApiResult<Product> {
    let product = products::update_product_status(&state, &session, org_id, id, input).await?;
    Ok(Success::ok(product).with_message("Statut mis à jour"))
}

/// DELETE /api/organizations/:org_id/products/:product_id
pub async fn delete(
    State(state): State<AppState>,
    JwtAuth(session): JwtAuth,
    Ids((org_id, id)): Ids<(Uuid, Uuid)>,
) -> ApiResult<()> {
    products::delete_product(&state, &session, org_id, id).await?;
    Ok(Success::done("Product supprimé"))
}
