//! Persistence gateway: local-first CRUD with an optional remote store.
//!
//! - Reads go to the remote store when connected and fall back to the local
//!   cache when disconnected or when the remote read fails.
//! - Writes are a two-step pipeline: remote (best effort, failure logged),
//!   then local (always). The local cache reflects the latest attempted state
//!   whatever the remote outcome.
//! - Nothing here is transactional across the two stores.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stockroom_core::{ProductId, upsert_by_id};
use stockroom_inventory::{Product, default_categories};

use crate::connection::{ConnectionState, Connectivity, Credentials};
use crate::error::{GatewayError, RemoteError, StorageError};
use crate::local::{LocalStore, keys, read_json, write_json};
use crate::remote::{HttpConnector, RemoteConnector, RemoteStore, tables};

/// Outcome of [`PersistenceGateway::sync_local_to_cloud`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// `false` when there was no remote to push to.
    pub attempted: bool,
    pub products_pushed: usize,
    pub categories_pushed: usize,
    /// One entry per table whose upsert failed.
    pub failures: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct PersistenceGateway {
    local: Arc<dyn LocalStore>,
    connector: Arc<dyn RemoteConnector>,
    state: ConnectionState,
}

impl core::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn report_remote(table: &'static str, action: &'static str, outcome: Result<(), RemoteError>) {
    match outcome {
        Ok(()) => tracing::debug!(table, action, "remote write applied"),
        Err(err) => tracing::warn!(table, action, error = %err, "remote write failed; keeping local copy"),
    }
}

impl PersistenceGateway {
    /// Open over `local`, connecting over HTTP if credentials were saved earlier.
    pub async fn open(local: Arc<dyn LocalStore>) -> Result<Self, StorageError> {
        Self::open_with(local, Arc::new(HttpConnector)).await
    }

    pub async fn open_with(
        local: Arc<dyn LocalStore>,
        connector: Arc<dyn RemoteConnector>,
    ) -> Result<Self, StorageError> {
        let mut gateway = Self {
            local,
            connector,
            state: ConnectionState::Disconnected,
        };

        if let Some(credentials) = gateway.stored_credentials().await? {
            gateway.state = gateway.build_state(credentials);
        }
        Ok(gateway)
    }

    async fn stored_credentials(&self) -> Result<Option<Credentials>, StorageError> {
        let url = self.local.get(keys::DB_URL).await?;
        let key = self.local.get(keys::DB_KEY).await?;
        Ok(match (url, key) {
            (Some(url), Some(key)) => Some(Credentials { url, key }).filter(Credentials::is_complete),
            _ => None,
        })
    }

    fn build_state(&self, credentials: Credentials) -> ConnectionState {
        if !credentials.is_complete() {
            return ConnectionState::Disconnected;
        }
        match self.connector.connect(&credentials) {
            Ok(remote) => {
                tracing::info!(url = %credentials.url, "remote store connected");
                ConnectionState::Connected {
                    credentials,
                    remote,
                }
            }
            Err(err) => {
                tracing::error!(url = %credentials.url, error = %err, "failed to initialize remote client; using local storage only");
                ConnectionState::Disconnected
            }
        }
    }

    fn remote(&self) -> Option<Arc<dyn RemoteStore>> {
        self.state.remote()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn connectivity(&self) -> Connectivity {
        self.state.connectivity()
    }

    /// Credentials of the live connection, for pre-filling settings.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.state.credentials()
    }

    /// Whether the local cache has ever stored a product list.
    pub async fn has_local_products(&self) -> Result<bool, StorageError> {
        Ok(self.local.get(keys::PRODUCTS).await?.is_some())
    }

    async fn local_products(&self) -> Result<Option<Vec<Product>>, StorageError> {
        read_json(self.local.as_ref(), keys::PRODUCTS).await
    }

    async fn local_categories(&self) -> Result<Option<Vec<String>>, StorageError> {
        read_json(self.local.as_ref(), keys::CATEGORIES).await
    }

    // --- Products ---

    pub async fn get_products(&self) -> Result<Vec<Product>, GatewayError> {
        if let Some(remote) = self.remote() {
            match remote.select_products().await {
                Ok(products) => return Ok(products),
                Err(err) => {
                    tracing::warn!(table = tables::PRODUCTS, error = %err, "remote read failed; falling back to local cache")
                }
            }
        }
        Ok(self.local_products().await?.unwrap_or_default())
    }

    /// Create or replace by id.
    pub async fn save_product(&self, product: &Product) -> Result<(), GatewayError> {
        if let Some(remote) = self.remote() {
            let outcome = remote.upsert_products(std::slice::from_ref(product)).await;
            report_remote(tables::PRODUCTS, "upsert", outcome);
        }

        let mut current = self.local_products().await?.unwrap_or_default();
        upsert_by_id(&mut current, product.clone());
        write_json(self.local.as_ref(), keys::PRODUCTS, &current).await?;
        Ok(())
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        if let Some(remote) = self.remote() {
            let outcome = remote.delete_product(id).await;
            report_remote(tables::PRODUCTS, "delete", outcome);
        }

        let mut current = self.local_products().await?.unwrap_or_default();
        current.retain(|p| &p.id != id);
        write_json(self.local.as_ref(), keys::PRODUCTS, &current).await?;
        Ok(())
    }

    // --- Categories ---

    /// Active categories; the defaults when nothing has been stored yet.
    pub async fn get_categories(&self) -> Result<Vec<String>, GatewayError> {
        if let Some(remote) = self.remote() {
            match remote.select_categories().await {
                Ok(categories) => return Ok(categories),
                Err(err) => {
                    tracing::warn!(table = tables::CATEGORIES, error = %err, "remote read failed; falling back to local cache")
                }
            }
        }
        Ok(self.local_categories().await?.unwrap_or_else(default_categories))
    }

    /// Add `name`; already-present names leave the local list untouched.
    pub async fn add_category(&self, name: &str) -> Result<(), GatewayError> {
        if let Some(remote) = self.remote() {
            let outcome = remote.insert_category(name).await;
            report_remote(tables::CATEGORIES, "insert", outcome);
        }

        let mut current = self.local_categories().await?.unwrap_or_else(default_categories);
        if !current.iter().any(|c| c == name) {
            current.push(name.to_string());
            write_json(self.local.as_ref(), keys::CATEGORIES, &current).await?;
        }
        Ok(())
    }

    /// Validated add: trims, rejects empty and duplicate names.
    ///
    /// Returns the name as stored.
    pub async fn add_category_checked(&self, name: &str) -> Result<String, GatewayError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GatewayError::validation("Category name cannot be empty"));
        }
        if self.get_categories().await?.iter().any(|c| c == name) {
            return Err(GatewayError::validation("Category already exists"));
        }
        self.add_category(name).await?;
        Ok(name.to_string())
    }

    /// Remove `name` from the active list. Products keep referencing it.
    pub async fn delete_category(&self, name: &str) -> Result<(), GatewayError> {
        if let Some(remote) = self.remote() {
            let outcome = remote.delete_category(name).await;
            report_remote(tables::CATEGORIES, "delete", outcome);
        }

        let mut current = self.local_categories().await?.unwrap_or_else(default_categories);
        current.retain(|c| c != name);
        write_json(self.local.as_ref(), keys::CATEGORIES, &current).await?;
        Ok(())
    }

    /// Add `new_name`, delete `old_name`, then re-save every product in
    /// `old_name` under `new_name`. Returns the migrated products.
    ///
    /// Not atomic: a storage failure midway leaves products split between
    /// the two names. Renaming to the same name is a no-op.
    pub async fn rename_category(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<Vec<Product>, GatewayError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(GatewayError::validation("Category name cannot be empty"));
        }
        if new_name == old_name {
            return Ok(Vec::new());
        }
        if self.get_categories().await?.iter().any(|c| c == new_name) {
            return Err(GatewayError::validation("Category name already exists"));
        }

        self.add_category(new_name).await?;
        self.delete_category(old_name).await?;

        let affected: Vec<Product> = self
            .get_products()
            .await?
            .into_iter()
            .filter(|p| p.category == old_name)
            .map(|p| p.with_category(new_name))
            .collect();

        for product in &affected {
            self.save_product(product).await?;
        }

        tracing::info!(
            from = old_name,
            to = new_name,
            products = affected.len(),
            "category renamed"
        );
        Ok(affected)
    }

    // --- Connection ---

    /// Persist credentials and rebuild the remote client.
    ///
    /// Returns whether the gateway is now connected. Does not move any data.
    pub async fn save_credentials(&mut self, url: &str, key: &str) -> Result<bool, GatewayError> {
        self.local.set(keys::DB_URL, url).await?;
        self.local.set(keys::DB_KEY, key).await?;
        self.state = self.build_state(Credentials::new(url, key));
        Ok(self.is_connected())
    }

    /// Push the whole local cache to the remote store.
    ///
    /// Best effort: failures are logged and recorded in the report, nothing
    /// is rolled back.
    pub async fn sync_local_to_cloud(&self) -> Result<SyncReport, GatewayError> {
        let Some(remote) = self.remote() else {
            return Ok(SyncReport::default());
        };
        let mut report = SyncReport {
            attempted: true,
            ..SyncReport::default()
        };

        let products = self.local_products().await?.unwrap_or_default();
        if !products.is_empty() {
            match remote.upsert_products(&products).await {
                Ok(()) => report.products_pushed = products.len(),
                Err(err) => {
                    tracing::warn!(table = tables::PRODUCTS, error = %err, "initial sync failed");
                    report.failures.push(format!("{}: {err}", tables::PRODUCTS));
                }
            }
        }

        let categories = self.local_categories().await?.unwrap_or_default();
        if !categories.is_empty() {
            match remote.upsert_categories(&categories).await {
                Ok(()) => report.categories_pushed = categories.len(),
                Err(err) => {
                    tracing::warn!(table = tables::CATEGORIES, error = %err, "initial sync failed");
                    report.failures.push(format!("{}: {err}", tables::CATEGORIES));
                }
            }
        }

        tracing::info!(
            products = report.products_pushed,
            categories = report.categories_pushed,
            failures = report.failures.len(),
            "local data pushed to remote store"
        );
        Ok(report)
    }

    /// Save credentials, then push local data if the connection came up.
    pub async fn connect_and_sync(&mut self, url: &str, key: &str) -> Result<SyncReport, GatewayError> {
        if self.save_credentials(url, key).await? {
            self.sync_local_to_cloud().await
        } else {
            Ok(SyncReport::default())
        }
    }

    /// Forget credentials and drop the client; later calls are local-only.
    pub async fn disconnect(&mut self) -> Result<(), GatewayError> {
        self.local.remove(keys::DB_URL).await?;
        self.local.remove(keys::DB_KEY).await?;
        self.state = ConnectionState::Disconnected;
        tracing::info!("remote store disconnected");
        Ok(())
    }
}
