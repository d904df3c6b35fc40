//! Type-safe key-value persistence for the cart engine.
//!
//! Provides a small, ergonomic API for durable local storage with automatic
//! JSON serialization, over pluggable backends.
//!
//! # Example
//!
//! ```rust
//! use cart_kv::{Cache, MemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Cart {
//!     items: Vec<String>,
//! }
//!
//! let cache = Cache::new(MemoryStore::new());
//!
//! // Store a value
//! cache.set("cart:guest", &Cart { items: vec!["milk".into()] }).unwrap();
//!
//! // Retrieve a value
//! let cart: Option<Cart> = cache.get("cart:guest").unwrap();
//! assert!(cart.is_some());
//!
//! // Delete a value
//! cache.delete("cart:guest").unwrap();
//! ```

mod error;
mod file;
mod kv;
mod memory;

pub use error::KvError;
pub use file::FileStore;
pub use kv::{Cache, KvStore};
pub use memory::MemoryStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, FileStore, KvError, KvStore, MemoryStore};
}
