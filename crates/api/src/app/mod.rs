//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: use cases over the repository/publisher ports
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and extractor rejection mapping
//! - `errors.rs`: consistent `{"detail": ...}` error responses

use std::sync::Arc;

use axum::{Extension, Router};
use chrono::{Duration, Utc};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use stockroom_auth::Hs256Jwt;
use stockroom_infra::seed::seed_products;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router around already-wired services.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState { jwt: services.jwt() };

    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Wire storage from config, bootstrap the admin account, seed, and build the router.
pub async fn build_from_config(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(build_services(config).await?);

    services
        .ensure_admin(&config.admin_username, &config.admin_password)
        .await?;

    if config.seed_products > 0 {
        let repo = services.product_repository();
        seed_products(repo.as_ref(), config.seed_products, Utc::now().naive_utc()).await?;
    }

    Ok(build_app(services))
}

#[cfg(feature = "postgres")]
async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    use stockroom_infra::TracingEventPublisher;
    use stockroom_infra::repository::{PostgresProductRepository, PostgresUserRepository, postgres};

    let jwt = jwt_from_config(config);
    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set; using in-memory stores");
        return Ok(AppServices::in_memory(jwt));
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await?;
    postgres::migrate(&pool).await?;
    tracing::info!("connected to postgres");

    Ok(AppServices::new(
        Arc::new(PostgresProductRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool)),
        Arc::new(TracingEventPublisher),
        jwt,
    ))
}

#[cfg(not(feature = "postgres"))]
async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but postgres support is not compiled in; using in-memory stores");
    }
    Ok(AppServices::in_memory(jwt_from_config(config)))
}

fn jwt_from_config(config: &ApiConfig) -> Arc<Hs256Jwt> {
    Arc::new(Hs256Jwt::new(
        config.jwt_secret.as_bytes(),
        Duration::minutes(config.token_ttl_minutes),
    ))
}
