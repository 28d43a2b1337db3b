//! Per-product status derivation.
//!
//! A product's expiry instant is 00:00 UTC on its expiry date, so a product
//! dated today counts as expired once the day has started.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Product;

/// Look-ahead used for "expiring soon" unless configured otherwise.
pub const DEFAULT_WARNING_WINDOW_DAYS: u32 = 30;

/// Quantities strictly below this are low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Single-label status shown in the product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedStatus {
    Good,
    LowStock,
    ExpiringSoon,
    Expired,
}

impl DerivedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DerivedStatus::Good => "Good",
            DerivedStatus::LowStock => "Low Stock",
            DerivedStatus::ExpiringSoon => "Expiring Soon",
            DerivedStatus::Expired => "Expired",
        }
    }
}

impl core::fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

fn expiry_instant(product: &Product) -> DateTime<Utc> {
    product.expiry_date.and_time(NaiveTime::MIN).and_utc()
}

fn warning_cutoff(now: DateTime<Utc>, warning_window_days: u32) -> DateTime<Utc> {
    now + Duration::days(i64::from(warning_window_days))
}

pub fn is_expired(product: &Product, now: DateTime<Utc>) -> bool {
    expiry_instant(product) < now
}

/// Expires within the window but has not expired yet.
pub fn is_expiring_soon(product: &Product, now: DateTime<Utc>, warning_window_days: u32) -> bool {
    !is_expired(product, now) && expiry_instant(product) < warning_cutoff(now, warning_window_days)
}

pub fn is_low_stock(product: &Product) -> bool {
    product.quantity < LOW_STOCK_THRESHOLD
}

/// Collapse the predicates into one status. Expiry dominates low stock.
pub fn classify(product: &Product, now: DateTime<Utc>, warning_window_days: u32) -> DerivedStatus {
    if is_expired(product, now) {
        DerivedStatus::Expired
    } else if is_expiring_soon(product, now, warning_window_days) {
        DerivedStatus::ExpiringSoon
    } else if is_low_stock(product) {
        DerivedStatus::LowStock
    } else {
        DerivedStatus::Good
    }
}

/// Every status whose predicate holds, most severe first; `[Good]` if none.
///
/// The alert list shows a low-stock item that is also expiring with both
/// labels, unlike [`classify`].
pub fn status_labels(
    product: &Product,
    now: DateTime<Utc>,
    warning_window_days: u32,
) -> Vec<DerivedStatus> {
    let mut labels = Vec::with_capacity(2);
    if is_expired(product, now) {
        labels.push(DerivedStatus::Expired);
    } else if is_expiring_soon(product, now, warning_window_days) {
        labels.push(DerivedStatus::ExpiringSoon);
    }
    if is_low_stock(product) {
        labels.push(DerivedStatus::LowStock);
    }
    if labels.is_empty() {
        labels.push(DerivedStatus::Good);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use stockroom_core::ProductId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 9, 30, 0).unwrap()
    }

    fn product(quantity: u32, days_from_now: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: "Oat Milk".to_string(),
            category: "Dairy".to_string(),
            quantity,
            price: 3.5,
            expiry_date: now().date_naive() + Duration::days(days_from_now),
            notes: None,
        }
    }

    #[test]
    fn expired_takes_precedence_over_low_stock() {
        let p = product(8, -730);
        assert_eq!(classify(&p, now(), DEFAULT_WARNING_WINDOW_DAYS), DerivedStatus::Expired);
    }

    #[test]
    fn within_window_is_expiring_soon() {
        let p = product(45, 20);
        assert_eq!(classify(&p, now(), 30), DerivedStatus::ExpiringSoon);
    }

    #[test]
    fn far_expiry_with_low_quantity_is_low_stock() {
        let p = product(5, 200);
        assert_eq!(classify(&p, now(), 30), DerivedStatus::LowStock);
    }

    #[test]
    fn healthy_product_is_good() {
        let p = product(10, 31);
        assert_eq!(classify(&p, now(), 30), DerivedStatus::Good);
    }

    #[test]
    fn expiry_date_today_is_already_expired() {
        let p = product(50, 0);
        assert!(is_expired(&p, now()));
        assert!(!is_expiring_soon(&p, now(), 30));
    }

    #[test]
    fn tomorrow_is_expiring_not_expired() {
        let p = product(50, 1);
        assert!(!is_expired(&p, now()));
        assert!(is_expiring_soon(&p, now(), 30));
    }

    #[test]
    fn zero_day_window_never_reports_expiring_soon() {
        let p = product(50, 1);
        assert_eq!(classify(&p, now(), 0), DerivedStatus::Good);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        // Cutoff is now + 30 days at 09:30; a date 30 days out starts at 00:00
        // that day, so it is inside. 31 days out is not.
        assert!(is_expiring_soon(&product(50, 30), now(), 30));
        assert!(!is_expiring_soon(&product(50, 31), now(), 30));
    }

    #[test]
    fn labels_report_both_expiry_and_low_stock() {
        let p = product(3, 7);
        assert_eq!(
            status_labels(&p, now(), 30),
            vec![DerivedStatus::ExpiringSoon, DerivedStatus::LowStock]
        );
        assert_eq!(status_labels(&product(30, 90), now(), 30), vec![DerivedStatus::Good]);
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(DerivedStatus::ExpiringSoon.to_string(), "Expiring Soon");
        assert_eq!(DerivedStatus::LowStock.label(), "Low Stock");
    }

    #[test]
    fn midnight_boundary_uses_utc_start_of_day() {
        let p = Product {
            expiry_date: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
            ..product(50, 0)
        };
        let just_before = Utc.with_ymd_and_hms(2026, 6, 14, 23, 59, 59).unwrap();
        let at_midnight = Utc.with_ymd_and_hms(2026, 6, 15, 0, 0, 0).unwrap();
        assert!(!is_expired(&p, just_before));
        assert!(!is_expired(&p, at_midnight));
        assert!(is_expired(&p, at_midnight + Duration::seconds(1)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: classification is total and the expiry states never overlap.
            #[test]
            fn classify_is_total_and_expiry_states_exclusive(
                quantity in 0u32..200,
                offset in -1000i64..1000,
                window in 0u32..120,
            ) {
                let p = product(quantity, offset);
                let status = classify(&p, now(), window);

                prop_assert!(!(is_expired(&p, now()) && is_expiring_soon(&p, now(), window)));

                let expected = if is_expired(&p, now()) {
                    DerivedStatus::Expired
                } else if is_expiring_soon(&p, now(), window) {
                    DerivedStatus::ExpiringSoon
                } else if is_low_stock(&p) {
                    DerivedStatus::LowStock
                } else {
                    DerivedStatus::Good
                };
                prop_assert_eq!(status, expected);
                prop_assert_eq!(status_labels(&p, now(), window)[0], status);
            }
        }
    }
}
