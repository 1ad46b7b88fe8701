//! Persistence ports and their adapters.
//!
//! The traits are the only thing the API layer sees; which backend sits behind
//! them is decided once at startup.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use stockroom_auth::User;
use stockroom_core::ProductId;
use stockroom_products::{NewProduct, Product, ProductChanges};

pub use in_memory::{InMemoryProductRepository, InMemoryUserRepository};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresProductRepository, PostgresUserRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique column already holds this value.
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),

    /// The storage backend is unavailable or failed.
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Product storage.
///
/// Ids and timestamps are assigned here; callers pass the clock reading so
/// tests stay deterministic.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, ordered by id.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create(&self, input: NewProduct, now: NaiveDateTime) -> Result<Product, RepositoryError>;

    /// Returns `None` when no product has this id.
    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
        now: NaiveDateTime,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Returns `false` when no product has this id.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// User account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;
}

#[async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).list().await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).get(id).await
    }

    async fn create(&self, input: NewProduct, now: NaiveDateTime) -> Result<Product, RepositoryError> {
        (**self).create(input, now).await
    }

    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
        now: NaiveDateTime,
    ) -> Result<Option<Product>, RepositoryError> {
        (**self).update(id, changes, now).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<S> UserRepository for Arc<S>
where
    S: UserRepository + ?Sized,
{
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        (**self).find_by_email(email).await
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        (**self).create(username, email, password_hash).await
    }
}
