//! `stockroom-storage`
//!
//! **Responsibility:** local-first persistence for products and categories.
//!
//! This crate provides:
//! - A durable local key-value cache (SQLite) that every write lands in
//! - An optional remote table store, written opportunistically
//! - The gateway that applies the read-fallback / dual-write policy
//! - A session that keeps the in-memory lists a front-end renders from
//!
//! Remote failures are logged and never returned to callers.

pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod local;
pub mod remote;
pub mod session;
pub mod testing;

pub use config::StoreConfig;
pub use connection::{ConnectionState, Connectivity, Credentials};
pub use error::{GatewayError, RemoteError, StorageError};
pub use gateway::{PersistenceGateway, SyncReport};
pub use local::{InMemoryLocalStore, LocalStore, SqliteLocalStore, keys};
pub use remote::{HttpConnector, RemoteConnector, RemoteStore, RestTableClient};
pub use session::{InventorySession, SessionOptions};
