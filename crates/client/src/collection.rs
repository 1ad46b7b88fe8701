//! Local product collection state.
//!
//! Operations are not queued: concurrent mutations race, and the last
//! completed `load()` wins. `loading` stays set while any load is in flight.
//! The state lock is never held across a network call.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use stockroom_core::ProductId;
use stockroom_products::{NewProduct, Product, ProductChanges};

use crate::adapter::{ClientError, RestAdapter};
use crate::session::Session;

pub const NOT_LOGGED_IN: &str = "Not logged in.";

/// How local state follows the server after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Refetch the whole collection after every mutation.
    FullReload,
    /// Apply the record (or removal) the server answered with.
    #[default]
    ApplyResponse,
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apply" | "apply-response" => Ok(SyncMode::ApplyResponse),
            "reload" | "full-reload" => Ok(SyncMode::FullReload),
            other => Err(format!("unknown sync mode {other:?} (expected apply|reload)")),
        }
    }
}

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{}", NOT_LOGGED_IN)]
    NotAuthenticated,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CollectionError {
    /// Text for the error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            CollectionError::NotAuthenticated => NOT_LOGGED_IN,
            CollectionError::Client(err) => err.user_message(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    view: CollectionState,
    loads_in_flight: usize,
}

impl Inner {
    fn begin_load(&mut self) {
        self.loads_in_flight += 1;
        self.view.loading = true;
    }

    fn end_load(&mut self) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        self.view.loading = self.loads_in_flight > 0;
    }
}

pub struct ProductCollection {
    adapter: Arc<RestAdapter>,
    session: Arc<Session>,
    mode: SyncMode,
    state: RwLock<Inner>,
}

impl ProductCollection {
    pub fn new(adapter: Arc<RestAdapter>, session: Arc<Session>, mode: SyncMode) -> Self {
        Self {
            adapter,
            session,
            mode,
            state: RwLock::new(Inner::default()),
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn snapshot(&self) -> CollectionState {
        self.read(|s| s.clone())
    }

    pub fn products(&self) -> Vec<Product> {
        self.read(|s| s.products.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|s| s.loading)
    }

    /// Look a record up in the loaded collection (no network).
    pub fn find(&self, id: ProductId) -> Option<Product> {
        self.read(|s| s.products.iter().find(|p| p.id == id).cloned())
    }

    /// Fetch the full collection and replace local state wholesale.
    pub async fn load(&self) -> Result<(), CollectionError> {
        let token = self.token()?;
        self.update(Inner::begin_load);

        let result = self.adapter.fetch_products(&token).await;

        match result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "products loaded");
                self.update(|inner| {
                    inner.end_load();
                    inner.view.products = products;
                    inner.view.error = None;
                });
                Ok(())
            }
            Err(err) => {
                self.update(Inner::end_load);
                Err(self.fail(err.into()))
            }
        }
    }

    pub async fn add(&self, input: NewProduct) -> Result<Product, CollectionError> {
        let token = self.token()?;
        let product = match self.adapter.add_product(&token, &input).await {
            Ok(p) => p,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.sync(|products| upsert(products, product.clone())).await;
        Ok(product)
    }

    pub async fn edit(&self, id: ProductId, changes: ProductChanges) -> Result<Product, CollectionError> {
        let token = self.token()?;
        let product = match self.adapter.update_product(&token, id, &changes).await {
            Ok(p) => p,
            Err(err) => return Err(self.fail(err.into())),
        };

        self.sync(|products| upsert(products, product.clone())).await;
        Ok(product)
    }

    pub async fn remove(&self, id: ProductId) -> Result<(), CollectionError> {
        let token = self.token()?;
        if let Err(err) = self.adapter.delete_product(&token, id).await {
            return Err(self.fail(err.into()));
        }

        self.sync(|products| products.retain(|p| p.id != id)).await;
        Ok(())
    }

    /// Bring local state in line after a successful mutation.
    ///
    /// A failed reload is recorded in `error`; the mutation itself stands.
    async fn sync<F>(&self, apply: F)
    where
        F: FnOnce(&mut Vec<Product>),
    {
        match self.mode {
            SyncMode::ApplyResponse => self.write(|s| {
                apply(&mut s.products);
                s.error = None;
            }),
            SyncMode::FullReload => {
                let _ = self.load().await;
            }
        }
    }

    fn token(&self) -> Result<String, CollectionError> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => Err(self.fail(CollectionError::NotAuthenticated)),
        }
    }

    /// Record the failure; the previous list stays intact.
    fn fail(&self, err: CollectionError) -> CollectionError {
        tracing::warn!(error = %err, "product operation failed");
        self.write(|s| s.error = Some(err.user_message().to_string()));
        err
    }

    fn read<T>(&self, f: impl FnOnce(&CollectionState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner).view)
    }

    fn write(&self, f: impl FnOnce(&mut CollectionState)) {
        self.update(|inner| f(&mut inner.view));
    }

    fn update(&self, f: impl FnOnce(&mut Inner)) {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner));
    }
}

fn upsert(products: &mut Vec<Product>, product: Product) {
    match products.iter_mut().find(|p| p.id == product.id) {
        Some(existing) => *existing = product,
        None => products.push(product),
    }
}
