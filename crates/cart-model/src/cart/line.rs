//! Cart line items.

use crate::cart::RemoteLine;
use crate::catalog::{ProductSnapshot, VariantRef, VariantSelector};
use crate::error::CatalogError;
use crate::ids::{LineId, ProductId};
use crate::money::Money;
use crate::pricing::{resolve_price, PriceQuote};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_LINE: u32 = 999;

/// One line of the cart.
///
/// At most one line exists per (product identity, variant identity) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Server line id, present only once the line is known to the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<LineId>,
    /// Captured product data.
    pub product: ProductSnapshot,
    /// Quantity, always at least 1.
    pub quantity: u32,
    /// Resolved variant, if the product was added with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<VariantRef>,
}

impl CartLine {
    /// Create an unsynced line with quantity 1.
    pub fn new(product: ProductSnapshot, variant: Option<VariantRef>) -> Self {
        Self {
            line_id: None,
            product,
            quantity: 1,
            variant,
        }
    }

    /// Convert a server line, dropping entries without product data or with
    /// a zero quantity.
    pub fn from_remote(remote: RemoteLine) -> Option<Self> {
        let product = remote.product?.normalized().ok()?;
        if remote.quantity == 0 {
            return None;
        }
        Some(Self {
            line_id: Some(remote.line_id),
            product,
            quantity: remote.quantity,
            variant: remote.variant,
        })
    }

    /// Canonical product identifier of this line.
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.canonical_id()
    }

    /// Exact line identity: same product (through either alias) and same
    /// variant, where two absent variants are equal.
    pub fn is_line_for(&self, product_id: &str, variant: Option<&VariantRef>) -> bool {
        self.product.matches_id(product_id) && self.has_variant(variant)
    }

    /// Same as [`is_line_for`](Self::is_line_for), matching the product
    /// through any identifier `product` carries.
    pub fn is_same_line(&self, product: &ProductSnapshot, variant: Option<&VariantRef>) -> bool {
        self.product.same_product(product) && self.has_variant(variant)
    }

    fn has_variant(&self, variant: Option<&VariantRef>) -> bool {
        match (&self.variant, variant) {
            (None, None) => true,
            (Some(a), Some(b)) => a.matches(b),
            _ => false,
        }
    }

    /// Lookup by product with an optional variant filter; `None` matches any
    /// variant of the product.
    pub fn matches(&self, product_id: &str, variant: Option<&VariantRef>) -> bool {
        self.product.matches_id(product_id)
            && match (variant, &self.variant) {
                (None, _) => true,
                (Some(wanted), Some(own)) => wanted.matches(own),
                (Some(_), None) => false,
            }
    }

    /// Set a new quantity, validating the accepted range.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), CatalogError> {
        self.quantity = checked_quantity(quantity)?;
        Ok(())
    }

    /// Selector that re-resolves this line's variant for pricing.
    pub fn price_selector(&self) -> VariantSelector {
        match &self.variant {
            None => VariantSelector::NoVariant,
            Some(variant) => match self.product.find_variant(variant) {
                Some((index, _)) => VariantSelector::Index(index),
                None => variant
                    .discriminator()
                    .map(VariantSelector::from)
                    .unwrap_or(VariantSelector::NoVariant),
            },
        }
    }

    /// Unit pricing for this line.
    pub fn quote(&self) -> PriceQuote {
        resolve_price(Some(&self.product), Some(&self.price_selector()))
    }

    /// Display price × quantity, saturating on overflow.
    pub fn total(&self) -> Money {
        let unit = self.quote().display;
        unit.try_multiply(i64::from(self.quantity))
            .unwrap_or(Money::new(i64::MAX, unit.currency))
    }
}

/// Validate a requested quantity.
pub fn checked_quantity(quantity: i64) -> Result<u32, CatalogError> {
    if quantity <= 0 {
        return Err(CatalogError::InvalidQuantity(quantity));
    }
    match u32::try_from(quantity) {
        Ok(q) if q <= MAX_QUANTITY_PER_LINE => Ok(q),
        _ => Err(CatalogError::QuantityExceedsLimit(
            quantity,
            MAX_QUANTITY_PER_LINE,
        )),
    }
}
