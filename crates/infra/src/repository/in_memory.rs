use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use stockroom_auth::User;
use stockroom_core::{ProductId, UserId};
use stockroom_products::{NewProduct, Product, ProductChanges};

use super::{ProductRepository, RepositoryError, UserRepository};

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("in-memory store lock poisoned".to_string())
}

/// In-memory product store for tests/dev.
///
/// Ids come from a monotonically increasing sequence starting at 1 and are
/// never reused, even after deletes.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    inner: RwLock<BTreeMap<ProductId, Product>>,
    next_id: AtomicI64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn create(&self, input: NewProduct, now: NaiveDateTime) -> Result<Product, RepositoryError> {
        let id = ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let product = Product::create(id, input, now);

        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(id, product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
        now: NaiveDateTime,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(&id).map(|product| {
            product.apply(changes, now);
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}

/// In-memory user store for tests/dev.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    inner: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.inner.read().map_err(|_| poisoned())?;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.inner.read().map_err(|_| poisoned())?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut users = self.inner.write().map_err(|_| poisoned())?;

        // Mirrors the unique constraints of the SQL schema.
        if users.iter().any(|u| u.username == username) {
            return Err(RepositoryError::Duplicate("username"));
        }
        if users.iter().any(|u| u.email == email) {
            return Err(RepositoryError::Duplicate("email"));
        }

        let user = User {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 28)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn input(name: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price: 19.99,
            stock,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_list_is_ordered() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(input("Mouse", 3), now()).await.unwrap();
        let b = repo.create(input("Keyboard", 5), now()).await.unwrap();

        assert_eq!(a.id, ProductId::new(1));
        assert_eq!(b.id, ProductId::new(2));

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Mouse", "Keyboard"]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(input("Mouse", 3), now()).await.unwrap();
        assert!(repo.delete(a.id).await.unwrap());

        let b = repo.create(input("Router", 1), now()).await.unwrap();
        assert_eq!(b.id, ProductId::new(2));
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let repo = InMemoryProductRepository::new();
        let missing = ProductId::new(99);

        let updated = repo
            .update(missing, ProductChanges::default(), now())
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(!repo.delete(missing).await.unwrap());
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(input("Mouse", 3), now()).await.unwrap();

        let changes = ProductChanges {
            stock: Some(10),
            ..Default::default()
        };
        let updated = repo.update(created.id, changes, now()).await.unwrap().unwrap();

        assert_eq!(updated.name, "Mouse");
        assert_eq!(updated.stock, 10);
        assert_eq!(repo.get(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn users_are_unique_by_username_and_email() {
        let repo = InMemoryUserRepository::new();
        repo.create("admin", "admin@example.com", "h").await.unwrap();

        let err = repo.create("admin", "other@example.com", "h").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate("username")));

        let err = repo.create("other", "admin@example.com", "h").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate("email")));

        let found = repo.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(found.username, "admin");
    }
}
