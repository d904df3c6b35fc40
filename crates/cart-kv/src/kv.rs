//! Key-value store abstraction with automatic serialization.

use std::sync::Arc;

use crate::KvError;
use serde::{de::DeserializeOwned, Serialize};

/// Raw byte-oriented key-value backend.
///
/// Implementations must be durable for the lifetime the caller expects
/// (process lifetime for [`MemoryStore`](crate::MemoryStore), across restarts
/// for [`FileStore`](crate::FileStore)).
pub trait KvStore: Send + Sync {
    /// Get the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Store raw bytes under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KvError>;
}

/// Type-safe cache over any [`KvStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
}

impl Cache {
    /// Wrap a backend.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cart_kv::{Cache, MemoryStore};
    /// let cache = Cache::new(MemoryStore::new());
    /// cache.set("cart:guest", &vec![1, 2, 3]).unwrap();
    /// let items: Option<Vec<u32>> = cache.get("cart:guest").unwrap();
    /// assert_eq!(items, Some(vec![1, 2, 3]));
    /// ```
    pub fn new(store: impl KvStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist and an error if the stored
    /// bytes don't decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Get the raw bytes under `key` without decoding.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        self.store.get(key)
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), KvError> {
        self.store.delete(key)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// let key = cart_kv::cache_key!("cart", "user123");
/// assert_eq!(key, "cart:user123");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        sku: String,
        quantity: u32,
    }

    #[test]
    fn test_typed_round_trip() {
        let cache = Cache::new(MemoryStore::new());
        let lines = vec![Line {
            sku: "MILK-1L".into(),
            quantity: 2,
        }];
        cache.set("cart:items", &lines).unwrap();

        let loaded: Vec<Line> = cache.get("cart:items").unwrap().unwrap();
        assert_eq!(loaded, lines);
    }

    #[test]
    fn test_missing_key_is_none() {
        let cache = Cache::new(MemoryStore::new());
        let value: Option<Vec<Line>> = cache.get("nope").unwrap();
        assert!(value.is_none());
        assert!(cache.get_raw("nope").unwrap().is_none());
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let store = MemoryStore::new();
        store.set("cart:items", b"{not json").unwrap();
        let cache = Cache::new(store);

        let result: Result<Option<Vec<Line>>, _> = cache.get("cart:items");
        assert!(matches!(result, Err(KvError::SerializeError(_))));
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("cart", "guest"), "cart:guest");
        assert_eq!(cache_key!("cart", "user", 42), "cart:user:42");
    }
}
