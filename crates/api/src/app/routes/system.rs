use axum::Json;

use crate::app::dto::{HealthResponse, MessageResponse};

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Stockroom API".to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
