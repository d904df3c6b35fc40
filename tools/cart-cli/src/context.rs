//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use cart_kv::{Cache, FileStore};
use cart_model::{CartLine, ProductSnapshot};
use cart_sync::{CartGateway, CartStore, HttpCartGateway};

use crate::config::CliConfig;
use crate::output::Output;
use crate::transport::ReqwestTransport;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self {
            config: config.with_env(),
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        let config_names = ["cart.toml", ".cart.toml", "cart.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory the local cart is kept in.
    pub fn data_dir(&self) -> PathBuf {
        match &self.config.storage.data_dir {
            Some(dir) => self.resolve_path(dir),
            None => self.cwd.join(".cart"),
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Open the cart store over the local data directory.
    pub fn store(&self) -> Result<CartStore> {
        let dir = self.data_dir();
        let files = FileStore::open(&dir)
            .with_context(|| format!("Failed to open cart data directory: {}", dir.display()))?;
        self.output.debug(&format!("Local cart in {}", dir.display()));

        let gateway: Arc<dyn CartGateway> = Arc::new(HttpCartGateway::new(
            ReqwestTransport::new()?,
            self.config.gateway.clone(),
        ));
        let store = CartStore::new(self.config.store.clone(), Cache::new(files), gateway)
            .with_authenticated(self.config.is_signed_in());
        store.set_location(self.config.geo());
        Ok(store)
    }

    /// Products from the configured catalog file.
    pub fn catalog(&self) -> Result<Vec<ProductSnapshot>> {
        let Some(path) = &self.config.storage.catalog else {
            return Ok(Vec::new());
        };
        let path = self.resolve_path(path);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }

    /// Look up a product by either identifier, in the catalog first and then
    /// among the lines already in the cart.
    pub fn find_product(&self, id: &str, lines: &[CartLine]) -> Result<ProductSnapshot> {
        if let Some(product) = self.catalog()?.into_iter().find(|p| p.matches_id(id)) {
            return Ok(product);
        }
        match lines.iter().find(|l| l.product.matches_id(id)) {
            Some(line) => Ok(line.product.clone()),
            None => bail!("Product '{}' not found in the catalog or the cart", id),
        }
    }
}
