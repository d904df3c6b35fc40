//! Cart domain types for the cart synchronization engine.
//!
//! - **Catalog**: product and variant snapshots with identifier aliasing
//! - **Pricing**: the pure price resolver
//! - **Cart**: line items, the server snapshot shape, the derived aggregate
//!
//! # Example
//!
//! ```rust
//! use cart_model::prelude::*;
//!
//! let milk = ProductSnapshot::new("p-milk", "Milk 1L", Money::new(3000, Currency::INR))
//!     .with_storage_id("65af01");
//!
//! let mut line = CartLine::new(milk, None);
//! line.set_quantity(5).unwrap();
//!
//! let cart = CartAggregate::compute(&[line], &FeeSummary::default(), Currency::INR);
//! assert_eq!(cart.subtotal.amount_minor, 15000);
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod pricing;

pub mod cart;
pub mod catalog;

pub use cart::{
    checked_quantity, CartAggregate, CartLine, CartSnapshot, FeeSummary, LineView, RemoteLine,
    MAX_QUANTITY_PER_LINE,
};
pub use catalog::{ProductSnapshot, VariantRecord, VariantRef, VariantSelector};
pub use error::CatalogError;
pub use ids::*;
pub use money::{Currency, Money};
pub use pricing::{resolve_price, PriceQuote};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::pricing::{resolve_price, PriceQuote};

    // Catalog
    pub use crate::catalog::{ProductSnapshot, VariantRecord, VariantRef, VariantSelector};

    // Cart
    pub use crate::cart::{
        checked_quantity, CartAggregate, CartLine, CartSnapshot, FeeSummary, LineView,
        RemoteLine, MAX_QUANTITY_PER_LINE,
    };
}
