use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
};

use stockroom_auth::{NewUser, UserProfile};

use crate::app::dto::{self, LoginForm, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    form: Result<axum::Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let form = dto::form_body(form)?;
    let token = services.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let input = dto::json_body(body)?;
    let profile = services.register_user(input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
