use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::TokenError;
use crate::domain::repositories::RepositoryError;
use crate::domain::shared::FieldErrors;

/// Outcome discriminant carried by every response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Unauthorized,
    Forbidden,
    ValidationError,
    NotFound,
    Conflict,
    Error,
    Success,
}

impl ActionStatus {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ActionStatus::Unauthorized => StatusCode::UNAUTHORIZED,
            ActionStatus::Forbidden => StatusCode::FORBIDDEN,
            ActionStatus::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ActionStatus::NotFound => StatusCode::NOT_FOUND,
            ActionStatus::Conflict => StatusCode::CONFLICT,
            ActionStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
            ActionStatus::Success => StatusCode::OK,
        }
    }
}

/// Failed action: status, user-facing message and optional field errors
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: ActionStatus,
    pub message: String,
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: ActionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ActionStatus::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ActionStatus::Forbidden, message)
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: ActionStatus::ValidationError,
            message: "Données invalides".to_string(),
            errors: Some(errors),
        }
    }

    /// Validation failure on a single field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::validation(FieldErrors::single(field, message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ActionStatus::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ActionStatus::Conflict, message)
    }

    /// Logs the cause and hides it from the client
    pub fn internal_server_error(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Internal error");
        Self::new(ActionStatus::Error, "Une erreur interne est survenue")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: ActionStatus,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            status: self.status,
            message: &self.message,
            errors: self.errors.as_ref(),
        });
        (self.status.http_status(), body).into_response()
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::validation(errors)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => Self::not_found("Ressource introuvable"),
            RepositoryError::Conflict(constraint) => Self::conflict(conflict_message(&constraint)),
            RepositoryError::Database(message) => Self::internal_server_error(message),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired => Self::unauthorized("Session expirée"),
            TokenError::Invalid(_) => Self::unauthorized("Session invalide"),
            TokenError::Signing(message) => Self::internal_server_error(message),
        }
    }
}

/// User-facing message for a violated unique constraint
fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "users_email_key" => "Un compte existe déjà avec cet email",
        "organizations_siret_key" => "Une organisation existe déjà avec ce SIRET",
        "members_organization_user_key" => "Cet utilisateur est déjà membre de l'organisation",
        "members_last_owner" => "L'organisation doit conserver au moins un propriétaire",
        "clients_organization_email_key" => "Un client existe déjà avec cet email",
        "clients_organization_siret_key" => "Un client existe déjà avec ce SIRET",
        "suppliers_organization_email_key" => "Un fournisseur existe déjà avec cet email",
        "suppliers_organization_siret_key" => "Un fournisseur existe déjà avec ce SIRET",
        "products_organization_reference_key" => "Un produit existe déjà avec cette référence",
        "product_categories_organization_name_key" => "Une catégorie existe déjà avec ce nom",
        _ => "Cette ressource existe déjà",
    }
}

/// Successful action envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

/// Success response: HTTP status plus envelope
#[derive(Debug)]
pub struct Success<T> {
    code: StatusCode,
    envelope: Envelope<T>,
}

impl<T> Success<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK,
            envelope: Envelope {
                status: ActionStatus::Success,
                message: None,
                data,
            },
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            code: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }
}

impl Success<()> {
    /// Envelope with `data: null`, for deletions
    pub fn done(message: impl Into<String>) -> Self {
        Self::ok(()).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self.envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<Success<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn statuses_map_to_http_codes() {
        assert_eq!(ActionStatus::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ActionStatus::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ActionStatus::ValidationError.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ActionStatus::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ActionStatus::Conflict.http_status(), StatusCode::CONFLICT);
        assert_eq!(ActionStatus::Error.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn repository_conflicts_become_conflicts() {
        let error: ApiError =
            RepositoryError::Conflict("clients_organization_siret_key".to_string()).into();
        assert_eq!(error.status, ActionStatus::Conflict);
        assert_eq!(error.message, "Un client existe déjà avec ce SIRET");
    }

    #[test]
    fn database_errors_hide_details() {
        let error: ApiError = RepositoryError::Database("connection reset".to_string()).into();
        assert_eq!(error.status, ActionStatus::Error);
        assert!(!error.message.contains("connection reset"));
    }

    #[tokio::test]
    async fn validation_error_renders_field_errors() {
        let response = ApiError::invalid_field("name", "Le nom est requis").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["status"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["name"][0], "Le nom est requis");
    }

    #[tokio::test]
    async fn success_wraps_data() {
        let response = Success::created(vec![1, 2]).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["status"], "SUCCESS");
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn done_has_null_data() {
        let body = body_json(Success::done("Client supprimé").into_response()).await;
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["message"], "Client supprimé");
    }
}
