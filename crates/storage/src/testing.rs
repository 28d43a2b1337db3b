//! In-memory remote store and connectors for tests/dev.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use stockroom_core::{ProductId, upsert_by_id};
use stockroom_inventory::Product;

use crate::connection::Credentials;
use crate::error::RemoteError;
use crate::remote::{RemoteConnector, RemoteStore};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    categories: Vec<String>,
}

/// Remote table store held in memory.
///
/// `set_failing(true)` makes every call fail with a 503, which is how tests
/// simulate an unreachable backend.
#[derive(Debug)]
pub struct InMemoryRemoteStore {
    tables: RwLock<Tables>,
    failing: AtomicBool,
    calls: AtomicUsize,
    /// Calls numbered at or above this fail.
    fail_from_call: AtomicUsize,
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self {
            tables: RwLock::default(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            fail_from_call: AtomicUsize::new(usize::MAX),
        }
    }
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        if let Ok(mut t) = self.tables.write() {
            t.products = products;
        }
        self
    }

    pub fn with_categories(self, categories: Vec<String>) -> Self {
        if let Ok(mut t) = self.tables.write() {
            t.categories = categories;
        }
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Let the next `calls` operations succeed, then fail every one after.
    pub fn fail_after(&self, calls: usize) {
        let from = self.calls.load(Ordering::SeqCst).saturating_add(calls);
        self.fail_from_call.store(from, Ordering::SeqCst);
    }

    /// Number of operations attempted (including failed ones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn products(&self) -> Vec<Product> {
        self.tables
            .read()
            .map(|t| t.products.clone())
            .unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<String> {
        self.tables
            .read()
            .map(|t| t.categories.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), RemoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) || call >= self.fail_from_call.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> Result<R, RemoteError> {
        self.check()?;
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RemoteError::Network("lock poisoned".to_string()))?;
        Ok(f(&mut tables))
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn select_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.with_tables(|t| t.products.clone())
    }

    async fn upsert_products(&self, products: &[Product]) -> Result<(), RemoteError> {
        self.with_tables(|t| {
            for p in products {
                upsert_by_id(&mut t.products, p.clone());
            }
        })
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), RemoteError> {
        self.with_tables(|t| t.products.retain(|p| &p.id != id))
    }

    async fn select_categories(&self) -> Result<Vec<String>, RemoteError> {
        self.with_tables(|t| t.categories.clone())
    }

    async fn insert_category(&self, name: &str) -> Result<(), RemoteError> {
        self.with_tables(|t| {
            if t.categories.iter().any(|c| c == name) {
                return Err(RemoteError::Api {
                    status: 409,
                    body: format!("duplicate key value violates unique constraint: {name}"),
                });
            }
            t.categories.push(name.to_string());
            Ok(())
        })?
    }

    async fn upsert_categories(&self, names: &[String]) -> Result<(), RemoteError> {
        self.with_tables(|t| {
            for name in names {
                if !t.categories.contains(name) {
                    t.categories.push(name.clone());
                }
            }
        })
    }

    async fn delete_category(&self, name: &str) -> Result<(), RemoteError> {
        self.with_tables(|t| t.categories.retain(|c| c != name))
    }
}

/// Hands out one shared [`InMemoryRemoteStore`] for any complete credentials.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    store: Arc<InMemoryRemoteStore>,
}

impl InMemoryConnector {
    pub fn new(store: Arc<InMemoryRemoteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<InMemoryRemoteStore> {
        Arc::clone(&self.store)
    }
}

impl RemoteConnector for InMemoryConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        if !credentials.is_complete() {
            return Err(RemoteError::InvalidCredentials("url and key are required".to_string()));
        }
        let store: Arc<dyn RemoteStore> = self.store.clone();
        Ok(store)
    }
}

/// Connector whose client construction always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingConnector;

impl RemoteConnector for RejectingConnector {
    fn connect(&self, _credentials: &Credentials) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        Err(RemoteError::InvalidCredentials("client construction failed".to_string()))
    }
}
