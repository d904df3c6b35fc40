//! Product snapshots captured from the catalog.

use crate::catalog::{VariantRecord, VariantRef, VariantSelector};
use crate::error::CatalogError;
use crate::ids::{CategoryId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Catalog data needed to render and price a cart line.
///
/// The catalog source may supply two identifier fields, a public `id` and a
/// storage `_id`. Both are aliases of the same product; see
/// [`ProductSnapshot::canonical_id`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Public identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    /// Storage identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<ProductId>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Base price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    /// Reference (MRP) price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Money>,
    /// Direct discounted price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
    /// Legacy compare-at price, consulted only when no MRP is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,
    /// Ordered variant list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantRecord>,
    /// Pack or unit label (e.g. "1 L").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
    /// Category reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    /// Whether the product can currently be bought.
    #[serde(default = "default_true")]
    pub available: bool,
}

impl ProductSnapshot {
    /// Create a simple product with a public id and a base price.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: Some(id.into()),
            storage_id: None,
            name: name.into(),
            price: Some(price),
            mrp: None,
            discounted_price: None,
            compare_at_price: None,
            variants: Vec::new(),
            pack: None,
            category: None,
            available: true,
        }
    }

    /// Set the storage identifier alias.
    pub fn with_storage_id(mut self, id: impl Into<ProductId>) -> Self {
        self.storage_id = Some(id.into());
        self
    }

    /// Set the MRP.
    pub fn with_mrp(mut self, mrp: Money) -> Self {
        self.mrp = Some(mrp);
        self
    }

    /// Set the discounted price.
    pub fn with_discounted_price(mut self, price: Money) -> Self {
        self.discounted_price = Some(price);
        self
    }

    /// Append a variant.
    pub fn with_variant(mut self, variant: VariantRecord) -> Self {
        self.variants.push(variant);
        self
    }

    /// The single identifier a cart line is keyed on: the public id when
    /// present and non-blank, else the storage id.
    pub fn canonical_id(&self) -> Option<&ProductId> {
        self.id
            .as_ref()
            .filter(|id| !id.is_blank())
            .or_else(|| self.storage_id.as_ref().filter(|id| !id.is_blank()))
    }

    /// Check whether `id` names this product through either alias.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.as_ref().is_some_and(|p| p.as_str() == id)
            || self.storage_id.as_ref().is_some_and(|p| p.as_str() == id)
    }

    /// Check whether two snapshots denote the same product.
    pub fn same_product(&self, other: &ProductSnapshot) -> bool {
        [other.id.as_ref(), other.storage_id.as_ref()]
            .into_iter()
            .flatten()
            .any(|id| !id.is_blank() && self.matches_id(id.as_str()))
    }

    /// Return a copy whose public `id` holds the canonical identifier.
    ///
    /// The storage alias is kept so later lookups by either value still
    /// resolve to this product.
    pub fn normalized(mut self) -> Result<Self, CatalogError> {
        let canonical = self
            .canonical_id()
            .cloned()
            .ok_or_else(|| CatalogError::MissingIdentifier(self.name.clone()))?;
        self.id = Some(canonical);
        Ok(self)
    }

    /// Currency the product is priced in.
    pub fn currency(&self) -> Currency {
        [self.price, self.mrp, self.discounted_price, self.compare_at_price]
            .into_iter()
            .flatten()
            .chain(self.variants.iter().map(|v| v.price))
            .map(|m| m.currency)
            .next()
            .unwrap_or_default()
    }

    /// Resolve a variant selector against the variant list.
    ///
    /// An absent selector defaults to the first variant. A selector that was
    /// given but matches nothing resolves to `None`.
    pub fn resolve_variant(&self, selector: Option<&VariantSelector>) -> Option<&VariantRecord> {
        match selector {
            None => self.variants.first(),
            Some(VariantSelector::Index(i)) => self.variants.get(*i),
            Some(VariantSelector::Key(key)) => self.variants.iter().find(|v| v.matches_key(key)),
            Some(VariantSelector::NoVariant) => None,
        }
    }

    /// Find the variant a line reference points at.
    pub fn find_variant(&self, variant: &VariantRef) -> Option<(usize, &VariantRecord)> {
        self.variants
            .iter()
            .enumerate()
            .find(|(_, v)| variant.matches_record(v))
    }
}
