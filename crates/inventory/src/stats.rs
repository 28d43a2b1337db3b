//! Collection-wide statistics and derived lists for the dashboard.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Product;
use crate::status::{is_expired, is_expiring_soon, is_low_stock};

/// Aggregate over the whole product collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// Sum of quantities.
    pub total_items: u64,
    /// Sum of quantity × price.
    pub total_value: f64,
    pub low_stock_count: usize,
    pub expired_count: usize,
    pub expiring_soon_count: usize,
}

/// Single pass over `products`.
///
/// `expired_count` and `expiring_soon_count` never count the same item;
/// `low_stock_count` is independent of both.
pub fn aggregate(
    products: &[Product],
    now: DateTime<Utc>,
    warning_window_days: u32,
) -> InventoryStats {
    products
        .iter()
        .fold(InventoryStats::default(), |mut acc, p| {
            acc.total_items += u64::from(p.quantity);
            acc.total_value += p.line_value();

            if is_low_stock(p) {
                acc.low_stock_count += 1;
            }
            if is_expired(p, now) {
                acc.expired_count += 1;
            } else if is_expiring_soon(p, now, warning_window_days) {
                acc.expiring_soon_count += 1;
            }
            acc
        })
}

/// Items needing attention: low stock, expiring soon or already expired.
///
/// Ordered by expiry date ascending; ties keep input order.
pub fn alert_list(
    products: &[Product],
    now: DateTime<Utc>,
    warning_window_days: u32,
) -> Vec<Product> {
    let mut alerts: Vec<Product> = products
        .iter()
        .filter(|p| {
            is_low_stock(p) || is_expired(p, now) || is_expiring_soon(p, now, warning_window_days)
        })
        .cloned()
        .collect();
    alerts.sort_by_key(|p| p.expiry_date);
    alerts
}

/// Per-category totals (what the dashboard charts plot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub product_count: usize,
    pub total_quantity: u64,
    pub total_value: f64,
}

/// Totals grouped by category name, sorted by name.
pub fn category_breakdown(products: &[Product]) -> Vec<CategorySummary> {
    let mut by_name: BTreeMap<&str, CategorySummary> = BTreeMap::new();
    for p in products {
        let entry = by_name
            .entry(p.category.as_str())
            .or_insert_with(|| CategorySummary {
                category: p.category.clone(),
                product_count: 0,
                total_quantity: 0,
                total_value: 0.0,
            });
        entry.product_count += 1;
        entry.total_quantity += u64::from(p.quantity);
        entry.total_value += p.line_value();
    }
    by_name.into_values().collect()
}

/// Category names still referenced by products but missing from `active`.
pub fn archived_categories(products: &[Product], active: &[String]) -> Vec<String> {
    let referenced: BTreeSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
    referenced
        .into_iter()
        .filter(|name| !active.iter().any(|a| a == name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use stockroom_core::ProductId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
    }

    fn product(name: &str, category: &str, quantity: u32, price: f64, days: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            price,
            expiry_date: now().date_naive() + Duration::days(days),
            notes: None,
        }
    }

    fn fixture() -> Vec<Product> {
        vec![
            product("Almond Milk", "Dairy", 45, 240.0, 120),
            product("Cheddar Cheese", "Dairy", 8, 480.0, -400),
            product("Whole Wheat Bread", "Bakery", 15, 55.0, 5),
            product("Sparkling Water", "Beverages", 4, 20.0, 12),
        ]
    }

    #[test]
    fn aggregate_counts_each_band() {
        let stats = aggregate(&fixture(), now(), 30);
        assert_eq!(stats.total_items, 45 + 8 + 15 + 4);
        assert_eq!(stats.total_value, 45.0 * 240.0 + 8.0 * 480.0 + 15.0 * 55.0 + 4.0 * 20.0);
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.expiring_soon_count, 2);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate(&[], now(), 30), InventoryStats::default());
    }

    #[test]
    fn alert_list_is_sorted_by_expiry() {
        let alerts = alert_list(&fixture(), now(), 30);
        let names: Vec<&str> = alerts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cheddar Cheese", "Whole Wheat Bread", "Sparkling Water"]);
    }

    #[test]
    fn alert_list_includes_low_stock_with_distant_expiry() {
        let products = vec![product("Batteries", "Household", 2, 5.0, 900)];
        assert_eq!(alert_list(&products, now(), 30).len(), 1);
    }

    #[test]
    fn breakdown_groups_by_category() {
        let breakdown = category_breakdown(&fixture());
        let dairy = breakdown.iter().find(|c| c.category == "Dairy").unwrap();
        assert_eq!(dairy.product_count, 2);
        assert_eq!(dairy.total_quantity, 53);
        assert_eq!(breakdown[0].category, "Bakery");
    }

    #[test]
    fn archived_categories_lists_orphans_once() {
        let mut products = fixture();
        products.push(product("Kefir", "Fermented", 20, 4.0, 60));
        products.push(product("Kimchi", "Fermented", 20, 4.0, 60));
        let active = vec!["Dairy".to_string(), "Bakery".to_string()];
        assert_eq!(
            archived_categories(&products, &active),
            vec!["Beverages".to_string(), "Fermented".to_string()]
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: totals equal the plain sums over the input.
            #[test]
            fn totals_match_sums(
                rows in proptest::collection::vec((0u32..500, 0u32..10_000, -400i64..400), 0..40)
            ) {
                let products: Vec<Product> = rows
                    .iter()
                    .map(|(q, cents, days)| product("x", "c", *q, f64::from(*cents) / 100.0, *days))
                    .collect();
                let stats = aggregate(&products, now(), 30);

                let items: u64 = products.iter().map(|p| u64::from(p.quantity)).sum();
                let value: f64 = products.iter().map(|p| f64::from(p.quantity) * p.price).sum();
                prop_assert_eq!(stats.total_items, items);
                prop_assert!((stats.total_value - value).abs() < 1e-6);
                prop_assert!(stats.expired_count + stats.expiring_soon_count <= products.len());
                prop_assert!(stats.low_stock_count <= products.len());
            }
        }
    }
}
