//! Shopping cart module.
//!
//! Contains the cart line type, the server snapshot shape, and the derived
//! aggregate.

mod aggregate;
mod line;
mod snapshot;

pub use aggregate::{CartAggregate, LineView};
pub use line::{checked_quantity, CartLine, MAX_QUANTITY_PER_LINE};
pub use snapshot::{CartSnapshot, FeeSummary, RemoteLine};
