// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod extract;
pub mod handlers;
pub mod middleware;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use handlers::{
    addresses, auth, clients, contacts, fiscal_years, members, organizations, product_categories,
    products, suppliers, ClientParty, Party, SupplierParty,
};

/// Builds the application router with every route, layer and the shared state
pub fn router(state: AppState) -> Router {
    let app = Router::new()
        // Health check
        .route("/health", get(auth::health_check))
        // Auth routes
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        // Organizations and members
        .route(
            "/api/organizations",
            get(organizations::list).post(organizations::create),
        )
        .route(
            "/api/organizations/:org_id",
            get(organizations::get)
                .put(organizations::update)
                .delete(organizations::delete),
        )
        .route(
            "/api/organizations/:org_id/members",
            get(members::list).post(members::create),
        )
        .route(
            "/api/organizations/:org_id/members/:member_id",
            put(members::update_role).delete(members::delete),
        )
        // Clients and suppliers
        .route(
            "/api/organizations/:org_id/clients",
            get(clients::list).post(clients::create),
        )
        .route(
            "/api/organizations/:org_id/clients/:client_id",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route(
            "/api/organizations/:org_id/clients/:client_id/status",
            patch(clients::update_status),
        )
        .route(
            "/api/organizations/:org_id/suppliers",
            get(suppliers::list).post(suppliers::create),
        )
        .route(
            "/api/organizations/:org_id/suppliers/:supplier_id",
            get(suppliers::get)
                .put(suppliers::update)
                .delete(suppliers::delete),
        )
        .route(
            "/api/organizations/:org_id/suppliers/:supplier_id/status",
            patch(suppliers::update_status),
        )
        .merge(party_routes::<ClientParty>(
            "/api/organizations/:org_id/clients/:client_id",
        ))
        .merge(party_routes::<SupplierParty>(
            "/api/organizations/:org_id/suppliers/:supplier_id",
        ))
        // Catalogue
        .route(
            "/api/organizations/:org_id/product-categories",
            get(product_categories::list).post(product_categories::create),
        )
        .route(
            "/api/organizations/:org_id/product-categories/:category_id",
            put(product_categories::update).delete(product_categories::delete),
        )
        .route(
            "/api/organizations/:org_id/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/organizations/:org_id/products/:product_id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/api/organizations/:org_id/products/:product_id/status",
            patch(products::update_status),
        )
        // Fiscal years
        .route(
            "/api/organizations/:org_id/fiscal-years",
            get(fiscal_years::list).post(fiscal_years::create),
        )
        .route(
            "/api/organizations/:org_id/fiscal-years/:fiscal_year_id",
            get(fiscal_years::get)
                .put(fiscal_years::update)
                .delete(fiscal_years::delete),
        )
        .route(
            "/api/organizations/:org_id/fiscal-years/:fiscal_year_id/status",
            patch(fiscal_years::update_status),
        )
        // Middleware
        .layer(TraceLayer::new_for_http());

    let app = if state.config.cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app.layer(cors)
    } else {
        app
    };

    // Shared state
    app.with_state(state)
}

/// Address and contact routes under one client or supplier
fn party_routes<P: Party>(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/addresses", prefix),
            get(addresses::list::<P>).post(addresses::create::<P>),
        )
        .route(
            &format!("{}/addresses/:address_id", prefix),
            put(addresses::update::<P>).delete(addresses::delete::<P>),
        )
        .route(
            &format!("{}/addresses/:address_id/default", prefix),
            put(addresses::set_default::<P>),
        )
        .route(
            &format!("{}/contacts", prefix),
            get(contacts::list::<P>).post(contacts::create::<P>),
        )
        .route(
            &format!("{}/contacts/:contact_id", prefix),
            put(contacts::update::<P>).delete(contacts::delete::<P>),
        )
}
