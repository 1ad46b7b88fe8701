use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection};
use axum::extract::{Form, Json, Path};
use serde::{Deserialize, Serialize};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// OAuth2 password-grant form (`application/x-www-form-urlencoded`).
///
/// Only `username`/`password` are used; the other fields are accepted so
/// standard OAuth2 clients can post their usual form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub grant_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

// -------------------------
// Extractor rejections (all 422)
// -------------------------

pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError::Unprocessable(e.body_text()))
}

pub fn form_body<T>(body: Result<Form<T>, FormRejection>) -> Result<T, ApiError> {
    body.map(|Form(v)| v)
        .map_err(|e| ApiError::Unprocessable(e.body_text()))
}

pub fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    param
        .map(|Path(v)| v)
        .map_err(|e| ApiError::Unprocessable(e.body_text()))
}
