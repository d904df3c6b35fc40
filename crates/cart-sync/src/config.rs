//! Store and gateway configuration.

use std::fmt;
use std::time::Duration;

use cart_model::Currency;
use serde::{Deserialize, Serialize};

/// Configuration for a [`CartStore`](crate::CartStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key the line list is persisted under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// How long an "item added" event stays current before it is cleared.
    #[serde(default = "default_added_event_ms")]
    pub added_event_ms: u64,

    /// Currency the cart is priced in.
    #[serde(default)]
    pub currency: Currency,
}

fn default_storage_key() -> String {
    cart_kv::cache_key!("cart", "items")
}

fn default_added_event_ms() -> u64 {
    600
}

impl StoreConfig {
    /// Added-event lifetime as a `Duration`.
    pub fn added_event_ttl(&self) -> Duration {
        Duration::from_millis(self.added_event_ms)
    }

    /// Persist under a different key (e.g. one per signed-in account).
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Persist under the default key namespaced to `account`.
    pub fn for_account(self, account: &str) -> Self {
        let key = cart_kv::cache_key!(default_storage_key(), account);
        self.with_storage_key(key)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            added_event_ms: default_added_event_ms(),
            currency: Currency::default(),
        }
    }
}

/// Configuration for [`HttpCartGateway`](crate::HttpCartGateway).
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the cart API, e.g. `https://api.example.com/v1`.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token for the signed-in customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl GatewayConfig {
    /// Create a config for `base_url` without credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
