use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use stockroom_core::ProductId;
use stockroom_products::{NewProduct, Product, ProductChanges};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(services.list_products().await?))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let input = dto::json_body(body)?;
    tracing::debug!(username = user.username(), "create product");

    let product = services.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<ProductId>, PathRejection>,
    body: Result<Json<ProductChanges>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = dto::path_param(id)?;
    let changes = dto::json_body(body)?;
    tracing::debug!(username = user.username(), product_id = %id, "update product");

    Ok(Json(services.update_product(id, changes).await?))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<ProductId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = dto::path_param(id)?;
    tracing::debug!(username = user.username(), product_id = %id, "delete product");

    services.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
