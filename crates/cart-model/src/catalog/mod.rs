//! Catalog snapshot module.
//!
//! Contains the immutable-at-capture product and variant data a cart line
//! carries.

mod product;
mod variant;

pub use product::ProductSnapshot;
pub use variant::{VariantRecord, VariantRef, VariantSelector};
