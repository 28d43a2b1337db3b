//! Environment-driven configuration.
//!
//! - `STOCKROOM_DATA_DIR`: directory holding `store.db`
//!   (default `{app_data_dir}/stockroom`)
//! - `STOCKROOM_WARNING_DAYS`: expiring-soon look-ahead in days (default 30)

use std::path::PathBuf;

use anyhow::Context;
use stockroom_inventory::DEFAULT_WARNING_WINDOW_DAYS;

pub const DATA_DIR_VAR: &str = "STOCKROOM_DATA_DIR";
pub const WARNING_DAYS_VAR: &str = "STOCKROOM_WARNING_DAYS";

const DB_FILE: &str = "store.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub warning_window_days: u32,
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let data_dir = match lookup(DATA_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let warning_window_days = match lookup(WARNING_DAYS_VAR) {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    default = DEFAULT_WARNING_WINDOW_DAYS,
                    "{WARNING_DAYS_VAR} is not a whole number of days; using default"
                );
                DEFAULT_WARNING_WINDOW_DAYS
            }),
            None => DEFAULT_WARNING_WINDOW_DAYS,
        };

        Ok(Self {
            data_dir,
            warning_window_days,
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_warning_window_days(mut self, days: u32) -> Self {
        self.warning_window_days = days;
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }
}

/// `{app_data_dir}/stockroom`, falling back to `~/.local/share/stockroom`.
fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;
    Ok(base.join("stockroom"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn explicit_values_win() {
        let config = StoreConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/tmp/stockroom-test"),
            (WARNING_DAYS_VAR, "14"),
        ]))
        .unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/stockroom-test/store.db"));
        assert_eq!(config.warning_window_days, 14);
    }

    #[test]
    fn bad_window_falls_back_to_default() {
        let config = StoreConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/tmp/x"),
            (WARNING_DAYS_VAR, "soon"),
        ]))
        .unwrap();
        assert_eq!(config.warning_window_days, DEFAULT_WARNING_WINDOW_DAYS);
    }

    #[test]
    fn builders_override() {
        let config = StoreConfig::from_lookup(lookup(&[(DATA_DIR_VAR, "/a")]))
            .unwrap()
            .with_data_dir("/b")
            .with_warning_window_days(7);
        assert_eq!(config.data_dir, PathBuf::from("/b"));
        assert_eq!(config.warning_window_days, 7);
    }
}
