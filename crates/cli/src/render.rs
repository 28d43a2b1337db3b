//! Plain-text rendering for command output.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use stockroom_inventory::{CategorySummary, InventoryStats, Product, status_labels};
use stockroom_storage::SyncReport;

/// `₹1,234.50`
pub fn money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}₹{grouped}.{:02}", cents % 100)
}

pub fn products(rows: &[Product], now: DateTime<Utc>, window_days: u32) -> String {
    if rows.is_empty() {
        return "No products found.\n".to_string();
    }

    let name_w = rows.iter().map(|p| p.name.chars().count()).max().unwrap_or(0).max(4);
    let cat_w = rows.iter().map(|p| p.category.chars().count()).max().unwrap_or(0).max(8);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<name_w$}  {:<cat_w$}  {:>8}  {:>12}  {:<10}  STATUS",
        "ID", "NAME", "CATEGORY", "QTY", "PRICE", "EXPIRY"
    );
    for p in rows {
        let labels: Vec<&str> = status_labels(p, now, window_days)
            .iter()
            .map(|s| s.label())
            .collect();
        let _ = writeln!(
            out,
            "{:<36}  {:<name_w$}  {:<cat_w$}  {:>8}  {:>12}  {:<10}  {}",
            p.id,
            p.name,
            p.category,
            p.quantity,
            money(p.price),
            p.expiry_date.format("%Y-%m-%d"),
            labels.join(", ")
        );
    }
    out
}

pub fn stats(stats: &InventoryStats, breakdown: &[CategorySummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total items:    {}", stats.total_items);
    let _ = writeln!(out, "Total value:    {}", money(stats.total_value));
    let _ = writeln!(out, "Low stock:      {}", stats.low_stock_count);
    let _ = writeln!(out, "Expired:        {}", stats.expired_count);
    let _ = writeln!(out, "Expiring soon:  {}", stats.expiring_soon_count);

    if !breakdown.is_empty() {
        let _ = writeln!(out, "\nBy category:");
        for c in breakdown {
            let _ = writeln!(
                out,
                "  {:<16} {:>4} products  {:>8} units  {:>14}",
                c.category,
                c.product_count,
                c.total_quantity,
                money(c.total_value)
            );
        }
    }
    out
}

pub fn categories(active: &[String], archived: &[String]) -> String {
    let mut out = String::new();
    for name in active {
        let _ = writeln!(out, "{name}");
    }
    for name in archived {
        let _ = writeln!(out, "{name} (archived)");
    }
    out
}

pub fn sync_report(report: &SyncReport) -> String {
    if !report.attempted {
        return "Remote client could not be created; staying on local storage.\n".to_string();
    }
    let mut out = format!(
        "Connected. Pushed {} products and {} categories.\n",
        report.products_pushed, report.categories_pushed
    );
    for failure in &report.failures {
        let _ = writeln!(out, "  sync failed: {failure}");
    }
    out
}
