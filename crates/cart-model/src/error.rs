//! Catalog and cart model error types.

use thiserror::Error;

/// Errors raised while capturing catalog data into cart lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Product record carries neither a public nor a storage identifier.
    #[error("Product has no identifier: {0}")]
    MissingIdentifier(String),

    /// Quantity outside the accepted range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, u32),
}
