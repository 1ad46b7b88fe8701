use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use stockroom_auth::{PasswordError, TokenError};
use stockroom_core::DomainError;
use stockroom_infra::RepositoryError;

/// Every failure a handler can surface, mapped to one status + `{"detail": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body/path or input that failed validation.
    #[error("{0}")]
    Unprocessable(String),

    /// Well-formed request the backend refuses (e.g. duplicate username).
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Product not found")]
    ProductNotFound,

    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::ProductNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if let ApiError::Internal(cause) = &self {
            tracing::error!(%cause, "request failed");
        }

        let mut response = json_error(status, self.to_string());
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ApiError::Unprocessable(msg),
            DomainError::Conflict(msg) => ApiError::BadRequest(msg),
            DomainError::NotFound => ApiError::ProductNotFound,
            DomainError::Unauthorized => ApiError::InvalidCredentials,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate("email") => ApiError::BadRequest("Email already registered".to_string()),
            RepositoryError::Duplicate(_) => ApiError::BadRequest("Username already registered".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Internal(format!("token issuing failed: {err}"))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub fn json_error(status: StatusCode, detail: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "detail": detail.into() }))).into_response()
}
