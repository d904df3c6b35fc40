//! Remote cart gateway seam.
//!
//! The store depends on these five operations and nothing else. Transport
//! detail (status codes, headers) stays inside implementations; the store
//! only sees a snapshot or a [`GatewayError`].

mod memory;
mod rest;

pub use memory::{GatewayCall, MemoryGateway};
pub use rest::{HttpCartGateway, HttpTransport};

use async_trait::async_trait;
use cart_model::{CartSnapshot, LineId, ProductId, VariantRef};
use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// Optional location hint forwarded to fee computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Authoritative cart API.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Fetch the full server cart.
    async fn fetch(&self, geo: Option<GeoPoint>) -> Result<CartSnapshot, GatewayError>;

    /// Add `quantity` of a product (and variant) to the server cart.
    async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        variant: Option<&VariantRef>,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError>;

    /// Set the quantity of a server line.
    async fn update_quantity(
        &self,
        line_id: &LineId,
        quantity: u32,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError>;

    /// Remove a server line.
    async fn remove(
        &self,
        line_id: &LineId,
        geo: Option<GeoPoint>,
    ) -> Result<CartSnapshot, GatewayError>;

    /// Empty the server cart.
    async fn clear(&self) -> Result<(), GatewayError>;
}
