//! Application services: the use cases behind the HTTP handlers.
//!
//! Handlers stay thin; everything here is plain async Rust over the
//! repository/publisher ports, so it can be exercised without HTTP.

use std::sync::Arc;

use chrono::Utc;

use stockroom_auth::{Hs256Jwt, NewUser, User, UserProfile, hash_password, verify_password};
use stockroom_core::{DomainError, ProductId};
use stockroom_infra::{
    InMemoryProductRepository, InMemoryUserRepository, ProductEvent, ProductEventEnvelope,
    ProductEventPublisher, ProductRepository, TracingEventPublisher, UserRepository,
};
use stockroom_products::{NewProduct, Product, ProductChanges};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AppServices {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
    events: Arc<dyn ProductEventPublisher>,
    jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        events: Arc<dyn ProductEventPublisher>,
        jwt: Arc<Hs256Jwt>,
    ) -> Self {
        Self {
            products,
            users,
            events,
            jwt,
        }
    }

    /// In-memory wiring (dev/test) with log-only event publishing.
    pub fn in_memory(jwt: Arc<Hs256Jwt>) -> Self {
        Self::new(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(TracingEventPublisher),
            jwt,
        )
    }

    pub fn jwt(&self) -> Arc<Hs256Jwt> {
        self.jwt.clone()
    }

    pub fn product_repository(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    // -------------------------
    // Products
    // -------------------------

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.list().await?)
    }

    /// Create a product; a `Created` event is published only when it is sellable.
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, ApiError> {
        input.validate()?;

        let product = self.products.create(input, Utc::now().naive_utc()).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "product created");

        if product.is_sellable() {
            self.publish(ProductEvent::Created {
                product: product.clone(),
            });
        }

        Ok(product)
    }

    pub async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Product, ApiError> {
        changes.validate()?;

        let product = self
            .products
            .update(id, changes, Utc::now().naive_utc())
            .await?
            .ok_or(ApiError::ProductNotFound)?;
        tracing::info!(product_id = %product.id, "product updated");

        self.publish(ProductEvent::Updated {
            product: product.clone(),
        });
        Ok(product)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        if !self.products.delete(id).await? {
            return Err(ApiError::ProductNotFound);
        }
        tracing::info!(product_id = %id, "product deleted");

        self.publish(ProductEvent::Deleted { product_id: id });
        Ok(())
    }

    fn publish(&self, event: ProductEvent) {
        self.events.publish(ProductEventEnvelope::new(event, Utc::now()));
    }

    // -------------------------
    // Users / auth
    // -------------------------

    /// Check credentials; `None` for an unknown user or a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Authenticate and issue an access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let token = self.jwt.issue(&user.username, Utc::now())?;
        tracing::info!(username = %user.username, "login succeeded");
        Ok(token)
    }

    pub async fn register_user(&self, input: NewUser) -> Result<UserProfile, ApiError> {
        input.validate()?;

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(DomainError::conflict("Username already registered").into());
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::conflict("Email already registered").into());
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(&input.username, &input.email, &password_hash)
            .await?;
        tracing::info!(user_id = %user.id, username = %user.username, "user registered");

        Ok(user.profile())
    }

    /// Make sure the bootstrap account exists. Idempotent across restarts.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<(), ApiError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Ok(());
        }

        let password_hash = hash_password(password)?;
        let email = format!("{username}@localhost.localdomain");
        self.users.create(username, &email, &password_hash).await?;
        tracing::info!(%username, "bootstrap user created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockroom_infra::InMemoryEventRecorder;

    fn services_with_recorder() -> (AppServices, Arc<InMemoryEventRecorder>) {
        let recorder = Arc::new(InMemoryEventRecorder::new());
        let services = AppServices::new(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            recorder.clone(),
            Arc::new(Hs256Jwt::new(b"test-secret", Duration::minutes(30))),
        );
        (services, recorder)
    }

    fn input(stock: i64) -> NewProduct {
        NewProduct {
            name: "Webcam".to_string(),
            description: Some("Compact design for easy use.".to_string()),
            price: 49.5,
            stock,
        }
    }

    #[tokio::test]
    async fn created_event_only_for_sellable_products() {
        let (services, recorder) = services_with_recorder();

        services.create_product(input(0)).await.unwrap();
        assert!(recorder.events().is_empty());

        let sellable = services.create_product(input(4)).await.unwrap();
        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.event_type(), "products.product.created");
        assert_eq!(events[0].event.product_id(), sellable.id);
    }

    #[tokio::test]
    async fn invalid_product_is_not_stored() {
        let (services, _) = services_with_recorder();
        let err = services.create_product(NewProduct { price: 0.0, ..input(1) }).await.unwrap_err();

        assert!(matches!(err, ApiError::Unprocessable(_)));
        assert!(services.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_product_is_not_found() {
        let (services, recorder) = services_with_recorder();
        let missing = ProductId::new(404);

        let err = services.update_product(missing, ProductChanges::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::ProductNotFound));

        let err = services.delete_product(missing).await.unwrap_err();
        assert!(matches!(err, ApiError::ProductNotFound));
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn login_requires_matching_password() {
        let (services, _) = services_with_recorder();
        services.ensure_admin("admin", "secret123").await.unwrap();

        let token = services.login("admin", "secret123").await.unwrap();
        assert!(!token.is_empty());

        let err = services.login("admin", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        let err = services.login("nobody", "secret123").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let (services, _) = services_with_recorder();
        services.ensure_admin("admin", "secret123").await.unwrap();
        services.ensure_admin("admin", "other").await.unwrap();

        // The first password stays in effect.
        assert!(services.login("admin", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn registration_rejects_duplicates() {
        let (services, _) = services_with_recorder();
        let user = NewUser {
            username: "manuela".to_string(),
            password: "secret123".to_string(),
            email: "manuela@example.com".to_string(),
        };

        let profile = services.register_user(user.clone()).await.unwrap();
        assert_eq!(profile.username, "manuela");

        let err = services.register_user(user.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "Username already registered");

        let err = services
            .register_user(NewUser {
                username: "other".to_string(),
                ..user
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn registered_user_can_log_in() {
        let (services, _) = services_with_recorder();
        services
            .register_user(NewUser {
                username: "clerk".to_string(),
                password: "pa55word".to_string(),
                email: "clerk@example.com".to_string(),
            })
            .await
            .unwrap();

        assert!(services.login("clerk", "pa55word").await.is_ok());
    }
}
