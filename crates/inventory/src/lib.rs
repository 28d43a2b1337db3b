//! Inventory domain module.
//!
//! This crate contains the product model and the classification & aggregation
//! engine, implemented purely as deterministic domain logic (no IO, no
//! storage). Every function takes "now" explicitly so results are reproducible.

pub mod model;
pub mod query;
pub mod stats;
pub mod status;

pub use model::{DEFAULT_CATEGORIES, Product, ProductDraft, default_categories, sample_products};
pub use query::{CategoryFilter, SortField, SortOrder, SortSpec, filter_and_sort};
pub use stats::{
    CategorySummary, InventoryStats, aggregate, alert_list, archived_categories,
    category_breakdown,
};
pub use status::{
    DEFAULT_WARNING_WINDOW_DAYS, DerivedStatus, LOW_STOCK_THRESHOLD, classify, is_expired,
    is_expiring_soon, is_low_stock, status_labels,
};
