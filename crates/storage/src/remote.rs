//! Remote table store: `products` (primary key `id`) and `categories`
//! (primary key `name`), each supporting select-all, upsert and delete.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use stockroom_core::ProductId;
use stockroom_inventory::Product;

use crate::connection::Credentials;
use crate::error::RemoteError;

pub mod tables {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select_products(&self) -> Result<Vec<Product>, RemoteError>;
    async fn upsert_products(&self, products: &[Product]) -> Result<(), RemoteError>;
    async fn delete_product(&self, id: &ProductId) -> Result<(), RemoteError>;

    async fn select_categories(&self) -> Result<Vec<String>, RemoteError>;
    /// Plain insert; fails remotely if the name already exists.
    async fn insert_category(&self, name: &str) -> Result<(), RemoteError>;
    async fn upsert_categories(&self, names: &[String]) -> Result<(), RemoteError>;
    async fn delete_category(&self, name: &str) -> Result<(), RemoteError>;
}

/// Builds a remote client from credentials.
pub trait RemoteConnector: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn RemoteStore>, RemoteError>;
}

/// Connects with [`RestTableClient`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl RemoteConnector for HttpConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn RemoteStore>, RemoteError> {
        Ok(Arc::new(RestTableClient::new(credentials)?))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryRow {
    name: String,
}

/// PostgREST-style HTTP client (`{url}/rest/v1/{table}`).
///
/// The access key is sent both as `apikey` and as a bearer token.
#[derive(Clone)]
pub struct RestTableClient {
    base: Url,
    key: String,
    http: reqwest::Client,
}

impl core::fmt::Debug for RestTableClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestTableClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

impl RestTableClient {
    pub fn new(credentials: &Credentials) -> Result<Self, RemoteError> {
        let key = credentials.key.trim();
        if key.is_empty() {
            return Err(RemoteError::InvalidCredentials("access key is empty".to_string()));
        }

        let mut base = Url::parse(credentials.url.trim())
            .map_err(|e| RemoteError::InvalidCredentials(format!("url: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidCredentials(format!(
                "url: unsupported scheme '{}'",
                base.scheme()
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::InvalidCredentials(e.to_string()))?;

        Ok(Self {
            base,
            key: key.to_string(),
            http,
        })
    }

    pub fn table_url(&self, table: &str) -> Result<Url, RemoteError> {
        self.base
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| RemoteError::InvalidCredentials(format!("url: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let resp = req
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, columns: &str) -> Result<Vec<T>, RemoteError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", columns);

        let resp = self.send(self.request(Method::GET, url)).await?;
        resp.json().await.map_err(|e| RemoteError::Parse(e.to_string()))
    }

    async fn upsert<T: Serialize + Sync>(&self, table: &str, on_conflict: &str, rows: &[T]) -> Result<(), RemoteError> {
        let (columns, body) = uniform_rows(rows)?;
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("on_conflict", on_conflict)
            .append_pair("columns", &columns);

        let req = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);
        self.send(req).await.map(|_| ())
    }

    async fn delete_where(&self, table: &str, column: &str, value: &str) -> Result<(), RemoteError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair(column, &format!("eq.{value}"));

        self.send(self.request(Method::DELETE, url)).await.map(|_| ())
    }
}

/// Serialize `rows` so every object carries the same keys.
///
/// Bulk inserts require matching key sets, and optional fields are skipped
/// when empty, so missing keys are filled with `null`. Returns the sorted
/// comma-separated column list alongside the rows.
fn uniform_rows<T: Serialize>(rows: &[T]) -> Result<(String, Vec<Map<String, Value>>), RemoteError> {
    let mut objects = Vec::with_capacity(rows.len());
    let mut columns = BTreeSet::new();
    for row in rows {
        match serde_json::to_value(row).map_err(|e| RemoteError::Parse(format!("encode row: {e}")))? {
            Value::Object(map) => {
                columns.extend(map.keys().cloned());
                objects.push(map);
            }
            other => return Err(RemoteError::Parse(format!("row is not an object: {other}"))),
        }
    }

    for object in &mut objects {
        for column in &columns {
            object.entry(column.clone()).or_insert(Value::Null);
        }
    }

    let columns = columns.into_iter().collect::<Vec<_>>().join(",");
    Ok((columns, objects))
}

#[async_trait]
impl RemoteStore for RestTableClient {
    async fn select_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.select(tables::PRODUCTS, "*").await
    }

    async fn upsert_products(&self, products: &[Product]) -> Result<(), RemoteError> {
        self.upsert(tables::PRODUCTS, "id", products).await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), RemoteError> {
        self.delete_where(tables::PRODUCTS, "id", id.as_str()).await
    }

    async fn select_categories(&self) -> Result<Vec<String>, RemoteError> {
        let rows: Vec<CategoryRow> = self.select(tables::CATEGORIES, "name").await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }

    async fn insert_category(&self, name: &str) -> Result<(), RemoteError> {
        let url = self.table_url(tables::CATEGORIES)?;
        let req = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&CategoryRow {
                name: name.to_string(),
            });
        self.send(req).await.map(|_| ())
    }

    async fn upsert_categories(&self, names: &[String]) -> Result<(), RemoteError> {
        let rows: Vec<CategoryRow> = names
            .iter()
            .map(|name| CategoryRow { name: name.clone() })
            .collect();
        self.upsert(tables::CATEGORIES, "name", &rows).await
    }

    async fn delete_category(&self, name: &str) -> Result<(), RemoteError> {
        self.delete_where(tables::CATEGORIES, "name", name).await
    }
}
