//! In-memory working set for one front-end session.
//!
//! The session loads everything once, routes each user action through the
//! gateway, then applies the same change to its own lists. Statistics and
//! table views are recomputed from those lists on demand.

use chrono::{DateTime, Utc};

use stockroom_core::{DomainError, ProductId};
use stockroom_inventory::{
    CategoryFilter, CategorySummary, DEFAULT_WARNING_WINDOW_DAYS, DerivedStatus, InventoryStats,
    Product, ProductDraft, SortSpec, aggregate, alert_list, archived_categories,
    category_breakdown, classify, filter_and_sort, sample_products, status_labels,
};

use crate::error::GatewayError;
use crate::gateway::{PersistenceGateway, SyncReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub warning_window_days: u32,
    /// Show demo products on a first run with nothing stored anywhere.
    pub seed_sample_data: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            warning_window_days: DEFAULT_WARNING_WINDOW_DAYS,
            seed_sample_data: true,
        }
    }
}

#[derive(Debug)]
pub struct InventorySession {
    gateway: PersistenceGateway,
    options: SessionOptions,
    products: Vec<Product>,
    categories: Vec<String>,
}

impl InventorySession {
    pub async fn load(
        gateway: PersistenceGateway,
        options: SessionOptions,
        now: DateTime<Utc>,
    ) -> Result<Self, GatewayError> {
        let mut session = Self {
            gateway,
            options,
            products: Vec::new(),
            categories: Vec::new(),
        };
        session.reload(now).await?;
        Ok(session)
    }

    /// Re-read both lists from the gateway.
    pub async fn reload(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        let products = self.gateway.get_products().await?;
        let categories = self.gateway.get_categories().await?;

        // Sample rows are display-only; they are never written back.
        let first_run = products.is_empty()
            && !self.gateway.is_connected()
            && !self.gateway.has_local_products().await?;
        self.products = if first_run && self.options.seed_sample_data {
            tracing::info!("no stored inventory; showing sample products");
            sample_products(now.date_naive())
        } else {
            products
        };
        self.categories = categories;

        tracing::debug!(
            products = self.products.len(),
            categories = self.categories.len(),
            connected = self.gateway.is_connected(),
            "inventory loaded"
        );
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn is_connected(&self) -> bool {
        self.gateway.is_connected()
    }

    pub fn warning_window_days(&self) -> u32 {
        self.options.warning_window_days
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    // --- Product actions ---

    pub async fn add_product(&mut self, draft: ProductDraft) -> Result<Product, GatewayError> {
        let product = Product::new(draft)?;
        self.gateway.save_product(&product).await?;
        self.products.push(product.clone());
        Ok(product)
    }

    pub async fn update_product(
        &mut self,
        id: &ProductId,
        draft: ProductDraft,
    ) -> Result<Product, GatewayError> {
        let index = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| DomainError::not_found(format!("no product with id {id}")))?;

        let product = draft.into_product(id.clone())?;
        self.gateway.save_product(&product).await?;
        self.products[index] = product.clone();
        Ok(product)
    }

    pub async fn delete_product(&mut self, id: &ProductId) -> Result<(), GatewayError> {
        self.gateway.delete_product(id).await?;
        self.products.retain(|p| &p.id != id);
        Ok(())
    }

    // --- Category actions ---

    pub async fn add_category(&mut self, name: &str) -> Result<String, GatewayError> {
        let name = name.trim();
        if self.categories.iter().any(|c| c == name) {
            return Err(GatewayError::validation("Category already exists"));
        }
        let stored = self.gateway.add_category_checked(name).await?;
        self.categories.push(stored.clone());
        Ok(stored)
    }

    pub async fn rename_category(&mut self, old_name: &str, new_name: &str) -> Result<(), GatewayError> {
        let trimmed = new_name.trim();
        if trimmed != old_name && self.categories.iter().any(|c| c == trimmed) {
            return Err(GatewayError::validation("Category name already exists"));
        }

        self.gateway.rename_category(old_name, trimmed).await?;
        if trimmed == old_name {
            return Ok(());
        }

        for category in self.categories.iter_mut().filter(|c| *c == old_name) {
            *category = trimmed.to_string();
        }
        for product in self.products.iter_mut().filter(|p| p.category == old_name) {
            product.category = trimmed.to_string();
        }
        Ok(())
    }

    /// Products in the deleted category keep it (it becomes archived).
    pub async fn delete_category(&mut self, name: &str) -> Result<(), GatewayError> {
        self.gateway.delete_category(name).await?;
        self.categories.retain(|c| c != name);
        Ok(())
    }

    // --- Connection ---

    /// Save credentials, push local data, then reload from the new source.
    pub async fn connect(&mut self, url: &str, key: &str, now: DateTime<Utc>) -> Result<SyncReport, GatewayError> {
        if url.trim().is_empty() || key.trim().is_empty() {
            return Err(GatewayError::validation("Both the database URL and key are required"));
        }
        let report = self.gateway.connect_and_sync(url.trim(), key.trim()).await?;
        self.reload(now).await?;
        Ok(report)
    }

    pub async fn disconnect(&mut self, now: DateTime<Utc>) -> Result<(), GatewayError> {
        self.gateway.disconnect().await?;
        self.reload(now).await
    }

    // --- Derived views ---

    pub fn stats(&self, now: DateTime<Utc>) -> InventoryStats {
        aggregate(&self.products, now, self.options.warning_window_days)
    }

    pub fn alerts(&self, now: DateTime<Utc>) -> Vec<Product> {
        alert_list(&self.products, now, self.options.warning_window_days)
    }

    pub fn status_of(&self, product: &Product, now: DateTime<Utc>) -> DerivedStatus {
        classify(product, now, self.options.warning_window_days)
    }

    pub fn labels_of(&self, product: &Product, now: DateTime<Utc>) -> Vec<DerivedStatus> {
        status_labels(product, now, self.options.warning_window_days)
    }

    pub fn table(&self, search_term: &str, category: &CategoryFilter, sort: SortSpec) -> Vec<Product> {
        filter_and_sort(&self.products, search_term, category, sort.field, sort.order)
    }

    pub fn category_breakdown(&self) -> Vec<CategorySummary> {
        category_breakdown(&self.products)
    }

    pub fn archived_categories(&self) -> Vec<String> {
        archived_categories(&self.products, &self.categories)
    }
}
