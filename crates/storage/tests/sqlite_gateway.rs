//! Gateway and session behaviour over the SQLite-backed local cache.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;
use stockroom_inventory::{CategoryFilter, Product, ProductDraft, SortField, SortOrder, SortSpec};
use stockroom_storage::testing::{InMemoryConnector, InMemoryRemoteStore};
use stockroom_storage::{
    InventorySession, LocalStore, PersistenceGateway, SessionOptions, SqliteLocalStore, keys,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
}

fn draft(name: &str, category: &str, quantity: u32, days: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: category.to_string(),
        quantity,
        price: 3.0,
        expiry_date: now().date_naive() + Duration::days(days),
        notes: Some("shelf 2".to_string()),
    }
}

fn no_samples() -> SessionOptions {
    SessionOptions {
        seed_sample_data: false,
        ..SessionOptions::default()
    }
}

#[tokio::test]
async fn never_connected_gateway_works_against_sqlite_only() {
    let local = Arc::new(SqliteLocalStore::in_memory());
    let gateway = PersistenceGateway::open(local.clone()).await.unwrap();
    assert!(!gateway.is_connected());

    let product = Product::new(draft("Milk", "Dairy", 20, 30)).unwrap();
    gateway.save_product(&product).await.unwrap();

    assert_eq!(gateway.get_products().await.unwrap(), vec![product]);
    let raw = local.get(keys::PRODUCTS).await.unwrap().unwrap();
    assert!(raw.contains("\"expiryDate\":\"2026-05-31\""));
}

#[tokio::test]
async fn deleted_category_keeps_its_products() {
    let local = Arc::new(SqliteLocalStore::in_memory());
    let gateway = PersistenceGateway::open(local).await.unwrap();

    let milk = Product::new(draft("Milk", "Dairy", 20, 30)).unwrap();
    let bread = Product::new(draft("Bread", "Bakery", 20, 3)).unwrap();
    gateway.save_product(&milk).await.unwrap();
    gateway.save_product(&bread).await.unwrap();

    gateway.delete_category("Dairy").await.unwrap();

    assert!(!gateway.get_categories().await.unwrap().contains(&"Dairy".to_string()));
    let products = gateway.get_products().await.unwrap();
    assert_eq!(products, vec![milk, bread]);
    assert_eq!(products[0].category, "Dairy");
}

#[tokio::test]
async fn session_survives_reopen_of_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.db");

    {
        let gateway = PersistenceGateway::open(Arc::new(SqliteLocalStore::open(&path))).await.unwrap();
        let mut session = InventorySession::load(gateway, no_samples(), now()).await.unwrap();
        session.add_product(draft("Yogurt", "Dairy", 4, 10)).await.unwrap();
        session.add_category("Frozen").await.unwrap();
    }

    let gateway = PersistenceGateway::open(Arc::new(SqliteLocalStore::open(&path))).await.unwrap();
    let session = InventorySession::load(gateway, SessionOptions::default(), now()).await.unwrap();
    assert_eq!(session.products().len(), 1);
    assert!(session.categories().contains(&"Frozen".to_string()));

    let stats = session.stats(now());
    assert_eq!(stats.total_items, 4);
    assert_eq!(stats.low_stock_count, 1);
    assert_eq!(stats.expiring_soon_count, 1);
}

#[tokio::test]
async fn connect_pushes_cache_then_remote_outage_falls_back() {
    let local = Arc::new(SqliteLocalStore::in_memory());
    let remote = Arc::new(InMemoryRemoteStore::new());
    let gateway = PersistenceGateway::open_with(local, Arc::new(InMemoryConnector::new(remote.clone())))
        .await
        .unwrap();
    let mut session = InventorySession::load(gateway, no_samples(), now()).await.unwrap();

    session.add_product(draft("Milk", "Dairy", 20, 30)).await.unwrap();
    session.add_product(draft("Bread", "Bakery", 2, 3)).await.unwrap();

    let report = session.connect("https://db.example.test", "anon", now()).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(remote.products().len(), 2);

    remote.set_failing(true);
    session.reload(now()).await.unwrap();
    let rows = session.table(
        "",
        &CategoryFilter::All,
        SortSpec {
            field: SortField::ExpiryDate,
            order: SortOrder::Asc,
        },
    );
    let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bread", "Milk"]);
}
