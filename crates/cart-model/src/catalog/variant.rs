//! Variant records, references and selectors.

use crate::ids::VariantId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A priced variant of a product (pack size, weight, colour...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    /// Variant identifier, when the catalog assigns one.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<VariantId>,
    /// Human-readable title or pack label (e.g. "500 g").
    #[serde(default, alias = "pack", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Non-discounted price of this variant.
    pub price: Money,
    /// Discounted selling price, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
}

impl VariantRecord {
    /// Create a variant with an id, a title and a price.
    pub fn new(id: impl Into<VariantId>, title: impl Into<String>, price: Money) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            price,
            discounted_price: None,
        }
    }

    /// Set the discounted selling price.
    pub fn with_discounted_price(mut self, price: Money) -> Self {
        self.discounted_price = Some(price);
        self
    }

    /// Check whether `key` names this variant by id or by title.
    pub fn matches_key(&self, key: &str) -> bool {
        self.id.as_ref().is_some_and(|id| id.as_str() == key)
            || self.title.as_deref().is_some_and(|t| t == key)
    }

    /// Identity of this variant as stored on a cart line.
    pub fn to_ref(&self) -> VariantRef {
        VariantRef {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// Variant identity carried by a cart line.
///
/// Two references denote the same variant when their ids are equal OR their
/// titles are equal; either match is sufficient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct VariantRef {
    /// Variant identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VariantId>,
    /// Variant title or pack label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl VariantRef {
    /// Reference a variant by id only.
    pub fn by_id(id: impl Into<VariantId>) -> Self {
        Self {
            id: Some(id.into()),
            title: None,
        }
    }

    /// Reference a variant by title only.
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
        }
    }

    /// Build from the optional id/title pair UI callers usually hold.
    ///
    /// Returns `None` when both are absent or blank.
    pub fn from_parts(id: Option<&str>, title: Option<&str>) -> Option<Self> {
        let id = id.filter(|s| !s.trim().is_empty()).map(VariantId::from);
        let title = title
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        if id.is_none() && title.is_none() {
            return None;
        }
        Some(Self { id, title })
    }

    /// Equal id OR equal title.
    pub fn matches(&self, other: &VariantRef) -> bool {
        let same_id = matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b);
        let same_title = matches!((&self.title, &other.title), (Some(a), Some(b)) if a == b);
        same_id || same_title
    }

    /// Check whether this reference names `record`.
    pub fn matches_record(&self, record: &VariantRecord) -> bool {
        self.matches(&record.to_ref())
    }

    /// The value used to discriminate pending-operation keys: id, else title.
    pub fn discriminator(&self) -> Option<&str> {
        self.id
            .as_ref()
            .map(VariantId::as_str)
            .or(self.title.as_deref())
    }
}

/// How a caller picks a variant when pricing or adding a product.
///
/// Passing no selector at all (`None`) means "use the first variant if the
/// product has any"; [`VariantSelector::NoVariant`] opts out of that default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantSelector {
    /// Position in the product's variant list.
    Index(usize),
    /// Variant id or title.
    Key(String),
    /// Explicitly price/add the bare product.
    NoVariant,
}

impl From<usize> for VariantSelector {
    fn from(index: usize) -> Self {
        VariantSelector::Index(index)
    }
}

impl From<&str> for VariantSelector {
    fn from(key: &str) -> Self {
        VariantSelector::Key(key.to_string())
    }
}

impl From<String> for VariantSelector {
    fn from(key: String) -> Self {
        VariantSelector::Key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_ref_matches_on_id_or_title() {
        let by_id = VariantRef::by_id("v-500");
        let by_title = VariantRef::by_title("500 g");
        let both = VariantRef {
            id: Some(VariantId::new("v-500")),
            title: Some("500 g".into()),
        };

        assert!(both.matches(&by_id));
        assert!(both.matches(&by_title));
        assert!(!by_id.matches(&by_title));
    }

    #[test]
    fn test_from_parts_ignores_blank() {
        assert!(VariantRef::from_parts(None, Some(" ")).is_none());
        let r = VariantRef::from_parts(Some("v1"), None).unwrap();
        assert_eq!(r.discriminator(), Some("v1"));
    }

    #[test]
    fn test_record_key_matching() {
        let v = VariantRecord::new("v-1kg", "1 kg", Money::new(9000, Currency::INR));
        assert!(v.matches_key("v-1kg"));
        assert!(v.matches_key("1 kg"));
        assert!(!v.matches_key("500 g"));
    }

    #[test]
    fn test_pack_alias_deserializes_as_title() {
        let v: VariantRecord = serde_json::from_str(
            r#"{"_id":"v1","pack":"250 ml","price":{"amount_minor":2500,"currency":"INR"}}"#,
        )
        .unwrap();
        assert_eq!(v.title.as_deref(), Some("250 ml"));
        assert_eq!(v.id, Some(VariantId::new("v1")));
    }
}
