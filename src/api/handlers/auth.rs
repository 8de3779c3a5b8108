use axum::extract::State;

use crate::actions::auth::{self, LoginInput, LoginResponse};
use crate::api::errors::{ApiResult, Success};
use crate::api::extract::Payload;
use crate::api::middleware::JwtAuth;
use crate::domain::user::{RegistrationInput, UserProfile};
use crate::state::AppState;

/// Register a new user
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Payload(input): Payload<RegistrationInput>,
) -> ApiResult<UserProfile> {
    let profile = auth::register(&state, input).await?;
    Ok(Success::created(profile).with_message("Compte créé"))
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Payload(input): Payload<LoginInput>,
) -> ApiResult<LoginResponse> {
    Ok(Success::ok(auth::login(&state, input).await?))
}

/// Current user
///
/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, JwtAuth(session): JwtAuth) -> ApiResult<UserProfile> {
    Ok(Success::ok(auth::me(&state, &session).await?))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
