use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::actions::Session;
use crate::api::errors::ApiError;
use crate::auth::jwt::verify_token;
use crate::state::AppState;

/// Authenticated session extractor for protected routes
///
/// Rejects with `UNAUTHORIZED` when the bearer token is missing, malformed or
/// expired, or when its user no longer exists or has been disabled.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(session): JwtAuth,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello user {}", session.user_id))
/// }
/// ```
pub struct JwtAuth(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for JwtAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentification requise"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Format attendu : Bearer <token>"))?;

        let claims = verify_token(token, &state.config.jwt_secret)?;

        let user = state
            .repositories
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "Token for unknown or disabled user");
                ApiError::unauthorized("Session invalide")
            })?;

        Ok(JwtAuth(Session {
            user_id: user.id,
            email: user.email.as_str().to_string(),
        }))
    }
}
