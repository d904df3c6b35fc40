//! Authoritative cart state as returned by the remote cart API.

use crate::catalog::{ProductSnapshot, VariantRef};
use crate::ids::LineId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Server-computed values the engine stores and exposes verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    /// Estimated delivery fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<Money>,
    /// Platform/handling fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_fee: Option<Money>,
    /// Subtotal above which delivery is free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_delivery_threshold: Option<Money>,
}

impl FeeSummary {
    /// Check if the server supplied no fee data at all.
    pub fn is_empty(&self) -> bool {
        self.delivery_fee.is_none()
            && self.platform_fee.is_none()
            && self.free_delivery_threshold.is_none()
    }
}

/// One server-side cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteLine {
    /// Server line id.
    #[serde(alias = "_id", alias = "id")]
    pub line_id: LineId,
    /// Populated product reference; `None` if the server could not resolve it.
    #[serde(default)]
    pub product: Option<ProductSnapshot>,
    /// Quantity.
    pub quantity: u32,
    /// Variant reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantRef>,
}

/// Complete server view of a cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Ordered line list.
    #[serde(default, alias = "items")]
    pub lines: Vec<RemoteLine>,
    /// Passthrough fee fields.
    #[serde(flatten)]
    pub fees: FeeSummary,
}
