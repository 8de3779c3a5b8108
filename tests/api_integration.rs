//! End-to-end API integration tests
//!
//! These tests drive the full router against the in-memory backend:
//! - Registration, login and the session extractor
//! - Organization, client and fiscal year flows
//! - Envelope statuses and HTTP codes for each failure kind

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use comptoir_api::api::router;
use comptoir_api::state::AppState;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot

fn setup_app() -> Router {
    router(AppState::in_memory())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Registers and logs in; returns the bearer token
async fn sign_up(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "motdepasse123",
            "full_name": "Utilisateur Test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "motdepasse123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["data"]["token"].as_str().unwrap().to_string()
}

async fn create_organization(app: &Router, token: &str, name: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/organizations",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_register_and_login_flow() {
    let app = setup_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "Marie.Curie@Exemple.fr",
            "password": "motdepasse123",
            "full_name": "Marie Curie"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["data"]["email"], "marie.curie@exemple.fr");
    assert!(json["data"].get("password_hash").is_none());

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "marie.curie@exemple.fr", "password": "motdepasse123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = json["data"]["token"].as_str().unwrap().to_string();

    let (status, json) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["full_name"], "Marie Curie");
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let app = setup_app();
    sign_up(&app, "doublon@exemple.fr").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "DOUBLON@exemple.fr",
            "password": "motdepasse123",
            "full_name": "Autre"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["status"], "CONFLICT");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = setup_app();
    sign_up(&app, "paul@exemple.fr").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "paul@exemple.fr", "password": "mauvais-mot" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = setup_app();

    let (status, json) = send(&app, "GET", "/api/organizations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["status"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/organizations", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation_errors() {
    let app = setup_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "email": "pas-un-email", "password": "court", "full_name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], "VALIDATION_ERROR");
    assert!(json["errors"]["email"].is_array());
    assert!(json["errors"]["password"].is_array());
    assert!(json["errors"]["full_name"].is_array());
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "VALIDATION_ERROR");
    assert!(json["errors"]["body"].is_array());
}

#[tokio::test]
async fn test_organization_lifecycle() {
    let app = setup_app();
    let token = sign_up(&app, "gerant@exemple.fr").await;
    let org_id = create_organization(&app, &token, "Boulangerie Martin").await;

    let (status, json) = send(&app, "GET", "/api/organizations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let organizations = json["data"].as_array().unwrap();
    assert_eq!(organizations.len(), 1);
    assert_eq!(organizations[0]["role"], "owner");

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/organizations/{}", org_id),
        Some(&token),
        Some(json!({ "name": "Boulangerie Martin & Fils", "siret": "732 829 320 00074" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["siret"], "73282932000074");

    let (status, json) = send(
        &app,
        "DELETE",
        &format!("/api/organizations/{}", org_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "SUCCESS");
    assert!(json["data"].is_null());

    let (status, json) = send(&app, "GET", "/api/organizations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_member_gets_not_found() {
    let app = setup_app();
    let owner = sign_up(&app, "owner@exemple.fr").await;
    let stranger = sign_up(&app, "stranger@exemple.fr").await;
    let org_id = create_organization(&app, &owner, "Atelier Dupont").await;

    let (status, json) = send(
        &app,
        "GET",
        &format!("/api/organizations/{}/clients", org_id),
        Some(&stranger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_path_id_is_not_found() {
    let app = setup_app();
    let owner = sign_up(&app, "owner@exemple.fr").await;
    let org_id = create_organization(&app, &owner, "Atelier Dupont").await;

    for uri in [
        "/api/organizations/pas-un-uuid".to_string(),
        format!("/api/organizations/{}/clients/42", org_id),
    ] {
        let (status, json) = send(&app, "GET", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "NOT_FOUND");
        assert_eq!(json["message"], "Ressource introuvable");
    }
}

#[tokio::test]
async fn test_viewer_cannot_write() {
    let app = setup_app();
    let owner = sign_up(&app, "patronne@exemple.fr").await;
    let viewer = sign_up(&app, "stagiaire@exemple.fr").await;
    let org_id = create_organization(&app, &owner, "Cabinet Leroy").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/organizations/{}/members", org_id),
        Some(&owner),
        Some(json!({ "email": "stagiaire@exemple.fr", "role": "viewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/organizations/{}/clients", org_id),
        Some(&viewer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/organizations/{}/clients", org_id),
        Some(&viewer),
        Some(json!({ "name": "Client interdit" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["status"], "FORBIDDEN");
}

#[tokio::test]
async fn test_client_flow_with_conflicts_and_filters() {
    let app = setup_app();
    let token = sign_up(&app, "commercial@exemple.fr").await;
    let org_id = create_organization(&app, &token, "Négoce Bernard").await;
    let clients_uri = format!("/api/organizations/{}/clients", org_id);

    let (status, json) = send(
        &app,
        "POST",
        &clients_uri,
        Some(&token),
        Some(json!({ "name": "Garage Central", "email": "contact@garage.fr", "siret": "44306184100047" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &clients_uri,
        Some(&token),
        Some(json!({ "name": "Autre garage", "email": "CONTACT@garage.fr" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["status"], "CONFLICT");

    send(
        &app,
        "POST",
        &clients_uri,
        Some(&token),
        Some(json!({ "name": "Jeanne Petit", "kind": "individual" })),
    )
    .await;

    let (status, json) = send(
        &app,
        "GET",
        &format!("{}?search=garage", clients_uri),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["name"], "Garage Central");

    // list is cached; a status change must still show up
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("{}/{}/status", clients_uri, client_id),
        Some(&token),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        &app,
        "GET",
        &format!("{}?search=garage", clients_uri),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(json["data"]["items"][0]["status"], "inactive");

    let (status, json) = send(
        &app,
        "GET",
        &format!("{}?page=0", clients_uri),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_client_addresses_keep_one_default() {
    let app = setup_app();
    let token = sign_up(&app, "compta@exemple.fr").await;
    let org_id = create_organization(&app, &token, "Menuiserie Roux").await;

    let (_, json) = send(
        &app,
        "POST",
        &format!("/api/organizations/{}/clients", org_id),
        Some(&token),
        Some(json!({ "name": "Hôtel du Port" })),
    )
    .await;
    let client_id = json["data"]["id"].as_str().unwrap().to_string();
    let addresses_uri = format!(
        "/api/organizations/{}/clients/{}/addresses",
        org_id, client_id
    );

    let (status, json) = send(
        &app,
        "POST",
        &addresses_uri,
        Some(&token),
        Some(json!({ "line1": "1 quai de la Fosse", "postal_code": "44000", "city": "Nantes" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["is_default"], true);
    assert_eq!(json["data"]["country"], "FR");
    let first_id = json["data"]["id"].as_str().unwrap().to_string();

    let (_, json) = send(
        &app,
        "POST",
        &addresses_uri,
        Some(&token),
        Some(json!({
            "line1": "8 rue Crébillon",
            "postal_code": "44000",
            "city": "Nantes",
            "is_default": true
        })),
    )
    .await;
    let second_id = json["data"]["id"].as_str().unwrap().to_string();

    let (_, json) = send(&app, "GET", &addresses_uri, Some(&token), None).await;
    let addresses = json["data"].as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0]["id"], second_id.as_str());
    assert_eq!(addresses[0]["is_default"], true);
    assert_eq!(addresses[1]["is_default"], false);

    let (status, json) = send(
        &app,
        "DELETE",
        &format!("{}/{}", addresses_uri, second_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["new_default_id"], first_id.as_str());

    let (status, json) = send(
        &app,
        "POST",
        &addresses_uri,
        Some(&token),
        Some(json!({ "line1": "3 rue X", "postal_code": "440", "city": "Nantes" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["errors"]["postal_code"].is_array());
}

#[tokio::test]
async fn test_supplier_contacts() {
    let app = setup_app();
    let token = sign_up(&app, "achats@exemple.fr").await;
    let org_id = create_organization(&app, &token, "Traiteur Lambert").await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/organizations/{}/suppliers", org_id),
        Some(&token),
        Some(json!({ "name": "Minoterie Girard" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let supplier_id = json["data"]["id"].as_str().unwrap().to_string();
    let contacts_uri = format!(
        "/api/organizations/{}/suppliers/{}/contacts",
        org_id, supplier_id
    );

    for (first_name, last_name) in [("Louis", "Zola"), ("Anne", "Blanc")] {
        let (status, _) = send(
            &app,
            "POST",
            &contacts_uri,
            Some(&token),
            Some(json!({ "first_name": first_name, "last_name": last_name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, json) = send(&app, "GET", &contacts_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = json["data"].as_array().unwrap();
    assert_eq!(contacts[0]["last_name"], "Blanc");
    assert_eq!(contacts[1]["last_name"], "Zola");

    // a supplier id under the clients prefix is unknown
    let (status, json) = send(
        &app,
        "GET",
        &format!(
            "/api/organizations/{}/clients/{}/contacts",
            org_id, supplier_id
        ),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Client introuvable");
}

#[tokio::test]
async fn test_products_and_categories() {
    let app = setup_app();
    let token = sign_up(&app, "catalogue@exemple.fr").await;
    let org_id = create_organization(&app, &token, "Fromagerie Blanc").await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/organizations/{}/product-categories", org_id),
        Some(&token),
        Some(json!({ "name": "Fromages" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/organizations/{}/product-categories", org_id),
        Some(&token),
        Some(json!({ "name": "FROMAGES" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let products_uri = format!("/api/organizations/{}/products", org_id);
    let (status, json) = send(
        &app,
        "POST",
        &products_uri,
        Some(&token),
        Some(json!({
            "reference": "COMTE-18",
            "name": "Comté 18 mois",
            "unit": "kilogram",
            "unit_price": "32.50",
            "vat_rate": "5.5",
            "category_id": category_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &products_uri,
        Some(&token),
        Some(json!({ "reference": "COMTE-18", "name": "Doublon", "unit_price": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(
        &app,
        "POST",
        &products_uri,
        Some(&token),
        Some(json!({
            "reference": "BRIE-01",
            "name": "Brie",
            "unit_price": "4",
            "category_id": uuid::Uuid::new_v4()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "NOT_FOUND");

    let product_uri = format!("{}/{}", products_uri, product_id);
    let (_, json) = send(&app, "GET", &product_uri, Some(&token), None).await;
    assert_eq!(json["data"]["category_id"], category_id.as_str());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!(
            "/api/organizations/{}/product-categories/{}",
            org_id, category_id
        ),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", &product_uri, Some(&token), None).await;
    assert!(json["data"]["category_id"].is_null());
}

#[tokio::test]
async fn test_fiscal_years_never_overlap() {
    let app = setup_app();
    let token = sign_up(&app, "expert@exemple.fr").await;
    let org_id = create_organization(&app, &token, "SARL Moreau").await;
    let uri = format!("/api/organizations/{}/fiscal-years", org_id);

    let (status, json) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "name": "Exercice 2025", "start_date": "2025-01-01", "end_date": "2025-12-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let fiscal_year_id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({ "name": "Chevauchement", "start_date": "2025-12-31", "end_date": "2026-12-30" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["status"], "CONFLICT");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("{}/{}/status", uri, fiscal_year_id),
        Some(&token),
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("{}/{}", uri, fiscal_year_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
