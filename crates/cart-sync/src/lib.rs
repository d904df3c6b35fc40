//! Optimistic cart store synchronized with a remote cart API.
//!
//! - **Store**: [`CartStore`] applies each mutation locally, persists it,
//!   then reconciles with the server or rolls back
//! - **Guard**: [`PendingOps`] drops duplicate in-flight mutations per line
//! - **Gateway**: the [`CartGateway`] seam, with an HTTP adapter and an
//!   in-memory server
//! - **Events**: transient "item added" notifications
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cart_kv::{Cache, MemoryStore};
//! use cart_model::prelude::*;
//! use cart_sync::prelude::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = CartStore::new(
//!     StoreConfig::default(),
//!     Cache::new(MemoryStore::new()),
//!     Arc::new(MemoryGateway::new()),
//! );
//!
//! let milk = ProductSnapshot::new("p-milk", "Milk 1L", Money::new(3000, Currency::INR));
//! store.add_item(milk.clone(), None, None).await.unwrap();
//! store.add_item(milk, None, None).await.unwrap();
//!
//! assert_eq!(store.quantity_of("p-milk", None), 2);
//! assert_eq!(store.aggregate().subtotal.amount_minor, 6000);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod guard;
mod persist;
mod store;

pub use config::{GatewayConfig, StoreConfig};
pub use error::{CartAction, CartError, GatewayError};
pub use events::{AddOrigin, EventNotifier, ItemAdded, NotifierEvent};
pub use gateway::{
    CartGateway, GatewayCall, GeoPoint, HttpCartGateway, HttpTransport, MemoryGateway,
};
pub use guard::{PendingOps, PendingPermit};
pub use persist::LocalCart;
pub use store::{CartState, CartStore, MutationOutcome};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{GatewayConfig, StoreConfig};
    pub use crate::error::{CartAction, CartError, GatewayError};
    pub use crate::events::{AddOrigin, NotifierEvent};
    pub use crate::gateway::{CartGateway, GeoPoint, HttpCartGateway, MemoryGateway};
    pub use crate::store::{CartState, CartStore, MutationOutcome};
}
