//! Remote connection state owned by a gateway instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::remote::RemoteStore;

/// Remote endpoint URL and access key, as entered in settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    /// Both fields are present (after trimming).
    pub fn is_complete(&self) -> bool {
        !self.url.trim().is_empty() && !self.key.trim().is_empty()
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Coarse connectivity, as shown in the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Remote client built; reads go remote first.
    Cloud,
    /// Local cache only.
    Local,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Cloud => "Cloud Connected",
            Connectivity::Local => "Local Storage",
        }
    }
}

/// Whether a remote client exists, and which credentials built it.
#[derive(Clone, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected {
        credentials: Credentials,
        remote: Arc<dyn RemoteStore>,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn connectivity(&self) -> Connectivity {
        if self.is_connected() {
            Connectivity::Cloud
        } else {
            Connectivity::Local
        }
    }

    pub fn remote(&self) -> Option<Arc<dyn RemoteStore>> {
        match self {
            ConnectionState::Connected { remote, .. } => Some(Arc::clone(remote)),
            ConnectionState::Disconnected => None,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            ConnectionState::Connected { credentials, .. } => Some(credentials),
            ConnectionState::Disconnected => None,
        }
    }
}

impl core::fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("Disconnected"),
            ConnectionState::Connected { credentials, .. } => f
                .debug_struct("Connected")
                .field("credentials", credentials)
                .finish_non_exhaustive(),
        }
    }
}
