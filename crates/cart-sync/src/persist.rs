//! Local durable copy of the cart line list.

use cart_kv::{Cache, KvError};
use cart_model::{CartLine, LineId, ProductSnapshot, VariantRef, MAX_QUANTITY_PER_LINE};
use serde::Deserialize;

/// Stored shape of a line, loose enough to survive older or damaged data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedLine {
    #[serde(default, alias = "_id")]
    line_id: Option<LineId>,
    #[serde(default)]
    product: Option<ProductSnapshot>,
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    variant: Option<VariantRef>,
}

impl PersistedLine {
    fn into_line(self) -> Option<CartLine> {
        let product = self.product?.normalized().ok()?;
        if self.quantity == 0 {
            return None;
        }
        Some(CartLine {
            line_id: self.line_id,
            product,
            quantity: self.quantity.min(MAX_QUANTITY_PER_LINE),
            variant: self.variant,
        })
    }
}

/// The line list persisted under one key.
#[derive(Debug, Clone)]
pub struct LocalCart {
    cache: Cache,
    key: String,
}

impl LocalCart {
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted lines.
    ///
    /// Never fails: unreadable or malformed content yields an empty cart,
    /// and individual entries without a usable product are dropped.
    /// Duplicate entries for the same line are merged.
    pub fn load(&self) -> Vec<CartLine> {
        let raw = match self.cache.get_raw(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read persisted cart");
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding malformed persisted cart");
                return Vec::new();
            }
        };

        let total = entries.len();
        let mut lines: Vec<CartLine> = Vec::with_capacity(total);
        for line in entries
            .into_iter()
            .filter_map(|v| serde_json::from_value::<PersistedLine>(v).ok())
            .filter_map(PersistedLine::into_line)
        {
            match lines
                .iter_mut()
                .find(|l| l.is_same_line(&line.product, line.variant.as_ref()))
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_QUANTITY_PER_LINE);
                }
                None => lines.push(line),
            }
        }

        if lines.len() < total {
            tracing::debug!(kept = lines.len(), total, "dropped unusable persisted cart entries");
        }
        lines
    }

    /// Overwrite the persisted lines.
    pub fn save(&self, lines: &[CartLine]) -> Result<(), KvError> {
        self.cache.set(&self.key, &lines)
    }

    /// Remove the persisted copy.
    pub fn clear(&self) -> Result<(), KvError> {
        self.cache.delete(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_kv::MemoryStore;
    use cart_model::{Currency, Money};

    fn local() -> LocalCart {
        LocalCart::new(Cache::new(MemoryStore::new()), "cart:items")
    }

    fn write_raw(local: &LocalCart, raw: &str) {
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        local.cache.set(local.key(), &value).unwrap();
    }

    #[test]
    fn test_round_trip_keeps_line_ids() {
        let local = local();
        let mut line = CartLine::new(
            ProductSnapshot::new("p-milk", "Milk", Money::new(3000, Currency::INR)),
            Some(VariantRef::by_title("1 L")),
        );
        line.line_id = Some(LineId::new("line-7"));
        line.quantity = 3;

        local.save(std::slice::from_ref(&line)).unwrap();
        assert_eq!(local.load(), vec![line]);
    }

    #[test]
    fn test_missing_key_is_empty() {
        assert!(local().load().is_empty());
    }

    #[test]
    fn test_not_a_list_is_empty() {
        let local = local();
        write_raw(&local, r#"{"lines": "oops"}"#);
        assert!(local.load().is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_empty() {
        let store = MemoryStore::new();
        cart_kv::KvStore::set(&store, "cart:items", b"\xff{not json").unwrap();
        let local = LocalCart::new(Cache::new(store), "cart:items");
        assert!(local.load().is_empty());
    }

    #[test]
    fn test_drops_null_products_and_merges_duplicates() {
        let local = local();
        write_raw(
            &local,
            r#"[
                {"product": null, "quantity": 2},
                {"quantity": 1},
                {"product": {"_id": "65af", "name": "Milk"}, "quantity": 0},
                {"product": {"_id": "65af", "name": "Milk"}, "quantity": 2},
                {"product": {"id": "p-milk", "_id": "65af", "name": "Milk"}, "quantity": 1},
                {"product": {"name": "No ids"}, "quantity": 1},
                {"product": {"_id": "65b0", "name": "Bread"}, "quantity": -4},
                "junk"
            ]"#,
        );

        let lines = local.load();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert!(lines[0].product.matches_id("65af"));
    }

    #[test]
    fn test_clear_removes_copy() {
        let local = local();
        local.save(&[]).unwrap();
        local.clear().unwrap();
        assert!(local.cache.get_raw(local.key()).unwrap().is_none());
    }
}
