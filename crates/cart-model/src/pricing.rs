//! Price resolution for products and variants.

use crate::catalog::{ProductSnapshot, VariantSelector};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Displayable pricing for one unit of a product (or one of its variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Price the customer pays.
    pub display: Money,
    /// Reference (MRP) price shown struck through.
    pub reference: Money,
    /// Rounded percentage saved against the reference price.
    pub discount_percent: u32,
    /// `reference > display`.
    pub has_discount: bool,
}

impl PriceQuote {
    /// The all-zero quote.
    pub fn zero(currency: Currency) -> Self {
        Self {
            display: Money::zero(currency),
            reference: Money::zero(currency),
            discount_percent: 0,
            has_discount: false,
        }
    }

    /// Amount saved per unit.
    pub fn savings(&self) -> Money {
        if self.has_discount {
            Money::new(
                self.reference.amount_minor - self.display.amount_minor,
                self.display.currency,
            )
        } else {
            Money::zero(self.display.currency)
        }
    }
}

fn positive(m: Option<Money>) -> Option<Money> {
    m.filter(Money::is_positive)
}

/// Compute the displayable price of `product` under `selector`.
///
/// Priority order (first match wins):
/// - display: variant discounted price, product discounted price, variant
///   price, product base price, zero.
/// - reference: variant price, product MRP, legacy compare-at, product base
///   price, zero.
///
/// Zero or negative amounts are skipped in both chains, except the product
/// base price. A missing product yields [`PriceQuote::zero`]. Pure and
/// deterministic.
///
/// ```
/// use cart_model::money::{Currency, Money};
/// use cart_model::{resolve_price, ProductSnapshot};
///
/// let p = ProductSnapshot::new("p-1", "Ghee", Money::new(10000, Currency::INR))
///     .with_mrp(Money::new(10000, Currency::INR))
///     .with_discounted_price(Money::new(8000, Currency::INR));
/// let quote = resolve_price(Some(&p), None);
/// assert!(quote.has_discount);
/// assert_eq!(quote.discount_percent, 20);
/// ```
pub fn resolve_price(
    product: Option<&ProductSnapshot>,
    selector: Option<&VariantSelector>,
) -> PriceQuote {
    let Some(product) = product else {
        return PriceQuote::zero(Currency::default());
    };
    let currency = product.currency();
    let variant = product.resolve_variant(selector);

    let display = positive(variant.and_then(|v| v.discounted_price))
        .or_else(|| positive(product.discounted_price))
        .or_else(|| positive(variant.map(|v| v.price)))
        .or(product.price)
        .unwrap_or_else(|| Money::zero(currency));

    let reference = positive(variant.map(|v| v.price))
        .or_else(|| positive(product.mrp))
        .or_else(|| positive(product.compare_at_price))
        .or(product.price)
        .unwrap_or_else(|| Money::zero(currency));

    let has_discount = reference.amount_minor > display.amount_minor;
    let discount_percent = if has_discount {
        percent_off(reference.amount_minor, display.amount_minor)
    } else {
        0
    };

    PriceQuote {
        display,
        reference,
        discount_percent,
        has_discount,
    }
}

/// round(100 × (reference − display) / reference), half away from zero.
fn percent_off(reference: i64, display: i64) -> u32 {
    if reference <= 0 {
        return 0;
    }
    let reference = i128::from(reference);
    let saved = reference - i128::from(display);
    let pct = (saved * 200 + reference) / (reference * 2);
    u32::try_from(pct.clamp(0, 100)).unwrap_or(0)
}
