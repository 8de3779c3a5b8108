use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Session;
use crate::api::errors::ApiError;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::shared::FieldErrors;
use crate::domain::user::value_objects::Email;
use crate::domain::user::{RegistrationInput, User, UserProfile};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

/// Creates an account; a taken email is a conflict
#[tracing::instrument(skip(state, input))]
pub async fn register(state: &AppState, input: RegistrationInput) -> Result<UserProfile, ApiError> {
    let registration = input.validate()?;

    if state
        .repositories
        .users
        .find_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Un compte existe déjà avec cet email"));
    }

    let cost = state.config.bcrypt_cost;
    let password = registration.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(ApiError::internal_server_error)?
        .map_err(ApiError::internal_server_error)?;

    let user = User {
        id: Uuid::new_v4(),
        email: registration.email,
        password_hash,
        full_name: registration.full_name,
        is_active: true,
        created_at: Utc::now(),
    };
    let profile = UserProfile::from(&user);
    state.repositories.users.create(user).await?;

    tracing::info!(user_id = %profile.id, "User registered");
    Ok(profile)
}

/// Exchanges credentials for a session token
#[tracing::instrument(skip(state, input))]
pub async fn login(state: &AppState, input: LoginInput) -> Result<LoginResponse, ApiError> {
    let mut errors = FieldErrors::new();
    if input.email.trim().is_empty() {
        errors.add("email", "Ce champ est requis");
    }
    if input.password.is_empty() {
        errors.add("password", "Ce champ est requis");
    }
    errors.into_result(())?;

    let invalid = || ApiError::unauthorized("Identifiants invalides");

    let email = Email::normalized(&input.email).map_err(|_| invalid())?;
    let user = state
        .repositories
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let password = input.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(ApiError::internal_server_error)?
        .map_err(ApiError::internal_server_error)?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Wrong password");
        return Err(invalid());
    }
    // only reported once the password is proven
    if !user.is_active {
        return Err(ApiError::unauthorized("Ce compte est désactivé"));
    }

    if let Err(e) = state.repositories.users.update_last_login(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to record last login");
    }

    let token = create_token(user.id, &state.config.jwt_secret)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(LoginResponse {
        token,
        user_id: user.id,
    })
}

/// Profile of the session user
pub async fn me(state: &AppState, session: &Session) -> Result<UserProfile, ApiError> {
    let user = state
        .repositories
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session invalide"))?;
    Ok(UserProfile::from(&user))
}
