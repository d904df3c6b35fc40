//! Pending-operation guard.
//!
//! A set of in-flight operation keys. A mutation that cannot acquire its key
//! returns without touching state or the network; the caller re-issues once
//! the in-flight one settles.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cart_model::{ProductId, VariantRef};

/// Key guarding every add/remove (and variant-less update) of a product.
pub fn product_key(product_id: &ProductId) -> String {
    format!("product:{}", product_id)
}

/// Key guarding a quantity update that names a variant.
///
/// Falls back to [`product_key`] when the reference carries no usable
/// discriminator.
pub fn variant_key(product_id: &ProductId, variant: &VariantRef) -> String {
    match variant.discriminator() {
        Some(v) => format!("product:{}:variant:{}", product_id, v),
        None => product_key(product_id),
    }
}

/// In-flight operation keys.
#[derive(Debug, Default)]
pub struct PendingOps {
    keys: Mutex<HashSet<String>>,
}

impl PendingOps {
    /// Create an empty guard set.
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<String>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `key` in flight. Returns `false` if it already was.
    pub fn try_acquire(&self, key: impl Into<String>) -> bool {
        self.keys().insert(key.into())
    }

    /// Clear `key`. Returns `false` if it was not held.
    pub fn release(&self, key: &str) -> bool {
        self.keys().remove(key)
    }

    /// Acquire `key` and get a permit that releases it when dropped.
    ///
    /// Dropping the permit is the guaranteed-execution release path: it runs
    /// on success, on error, on early return, and when the owning future is
    /// dropped mid-flight.
    pub fn guard(&self, key: impl Into<String>) -> Option<PendingPermit<'_>> {
        let key = key.into();
        if self.try_acquire(key.clone()) {
            Some(PendingPermit { ops: self, key })
        } else {
            None
        }
    }

    /// Check whether `key` is in flight.
    pub fn is_pending(&self, key: &str) -> bool {
        self.keys().contains(key)
    }

    /// Number of operations in flight.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Check if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ownership of one pending-operation key.
#[derive(Debug)]
#[must_use = "the key is released as soon as the permit is dropped"]
pub struct PendingPermit<'a> {
    ops: &'a PendingOps,
    key: String,
}

impl PendingPermit<'_> {
    /// The held key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for PendingPermit<'_> {
    fn drop(&mut self) {
        self.ops.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let ops = PendingOps::new();
        assert!(ops.try_acquire("product:p1"));
        assert!(!ops.try_acquire("product:p1"));
        assert!(ops.release("product:p1"));
        assert!(ops.try_acquire("product:p1"));
    }

    #[test]
    fn test_release_unheld_key() {
        let ops = PendingOps::new();
        assert!(!ops.release("product:nope"));
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let ops = PendingOps::new();
        {
            let permit = ops.guard("product:p1").unwrap();
            assert_eq!(permit.key(), "product:p1");
            assert!(ops.is_pending("product:p1"));
            assert!(ops.guard("product:p1").is_none());
        }
        assert!(ops.is_empty());
    }

    #[test]
    fn test_different_keys_do_not_block() {
        let ops = PendingOps::new();
        let _a = ops.guard("product:a").unwrap();
        let _b = ops.guard("product:b").unwrap();
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn test_variant_keys() {
        let id = ProductId::new("p1");
        assert_eq!(product_key(&id), "product:p1");
        assert_eq!(
            variant_key(&id, &VariantRef::by_title("500 g")),
            "product:p1:variant:500 g"
        );
        assert_eq!(variant_key(&id, &VariantRef::default()), "product:p1");
        assert_ne!(
            variant_key(&id, &VariantRef::by_id("v1")),
            variant_key(&id, &VariantRef::by_id("v2"))
        );
    }
}
