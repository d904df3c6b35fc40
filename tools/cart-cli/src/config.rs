//! CLI configuration.

use anyhow::{Context, Result};
use cart_sync::{GatewayConfig, GeoPoint, StoreConfig};
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Cart API settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Delivery location forwarded to the cart API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Apply `CART_API_URL` and `CART_TOKEN` from the environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(
            std::env::var("CART_API_URL").ok(),
            std::env::var("CART_TOKEN").ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.gateway.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.gateway.token = Some(token);
        }
        self
    }

    /// Whether a cart API is configured.
    pub fn has_gateway(&self) -> bool {
        !self.gateway.base().is_empty()
    }

    /// A signed-in identity gets a server-backed cart.
    pub fn is_signed_in(&self) -> bool {
        self.has_gateway() && self.gateway.token.is_some()
    }

    pub fn geo(&self) -> Option<GeoPoint> {
        self.location
            .as_ref()
            .map(|l| GeoPoint::new(l.latitude, l.longitude))
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the local cart is kept in (default: `.cart` in the working
    /// directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// JSON file with the products that can be added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
}

/// Fixed delivery location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}
