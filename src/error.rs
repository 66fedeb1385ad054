use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::{
    dto::{ErrorResponse, ValidationErrorResponse},
    repo::StoreError,
    validation::EMAIL_TAKEN,
};

pub const MISSING_CREDENTIALS: &str = "E-mail e senha são obrigatórios.";
pub const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos.";
pub const USER_NOT_FOUND: &str = "Usuário não encontrado.";
pub const INTERNAL_ERROR: &str = "Erro interno do servidor.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Body that is not valid JSON or has a field of the wrong type.
    #[error("malformed request body: {0}")]
    BadRequest(#[from] JsonRejection),

    #[error("email and password are required")]
    MissingCredentials,

    /// Deliberately does not say whether the email or the password was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user {0} not found")]
    NotFound(i64),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingCredentials => StatusCode::BAD_REQUEST,
            // serde data errors answer 400 like every other input problem
            AppError::BadRequest(rejection)
                if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                StatusCode::BAD_REQUEST
            }
            AppError::BadRequest(rejection) => rejection.status(),
            AppError::Store(StoreError::DuplicateEmail) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PasswordHash(_) | AppError::Store(StoreError::Database(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn error_body(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(errors) => {
                (status, Json(ValidationErrorResponse { errors })).into_response()
            }
            AppError::BadRequest(rejection) => {
                tracing::warn!(error = %rejection, "request body rejected");
                (
                    status,
                    Json(ValidationErrorResponse {
                        errors: vec![rejection.body_text()],
                    }),
                )
                    .into_response()
            }
            AppError::Store(StoreError::DuplicateEmail) => (
                status,
                Json(ValidationErrorResponse {
                    errors: vec![EMAIL_TAKEN.to_string()],
                }),
            )
                .into_response(),
            AppError::MissingCredentials => error_body(status, MISSING_CREDENTIALS),
            AppError::InvalidCredentials => error_body(status, INVALID_CREDENTIALS),
            AppError::NotFound(_) => error_body(status, USER_NOT_FOUND),
            AppError::PasswordHash(ref e) => {
                tracing::error!(error = %e, "password hashing failed");
                error_body(status, INTERNAL_ERROR)
            }
            AppError::Store(ref e) => {
                tracing::error!(error = %e, "user store failed");
                error_body(status, INTERNAL_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_every_message() {
        let (status, json) =
            body_json(AppError::Validation(vec!["a".into(), "b".into()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "erros": ["a", "b"] }));
    }

    #[tokio::test]
    async fn credential_errors() {
        let (status, json) = body_json(AppError::MissingCredentials).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["erro"], MISSING_CREDENTIALS);

        let (status, json) = body_json(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["erro"], INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn not_found_and_duplicate() {
        let (status, json) = body_json(AppError::NotFound(9)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["erro"], USER_NOT_FOUND);

        let (status, json) = body_json(StoreError::DuplicateEmail.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["erros"][0], EMAIL_TAKEN);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, json) =
            body_json(AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["erro"], INTERNAL_ERROR);

        let (status, json) = body_json(AppError::PasswordHash("bad salt".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!json.to_string().contains("bad salt"));
    }
}
