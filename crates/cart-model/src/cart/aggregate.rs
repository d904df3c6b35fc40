//! Derived cart aggregate.

use crate::cart::{CartLine, FeeSummary};
use crate::money::{Currency, Money};
use crate::pricing::PriceQuote;
use serde::Serialize;

/// A line together with its resolved unit pricing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    /// The line itself.
    pub line: CartLine,
    /// Unit pricing.
    pub quote: PriceQuote,
    /// Display price × quantity.
    pub total: Money,
}

/// Everything a cart view renders, recomputed from the line list.
///
/// Never stored; the fee fields are copied through from the last server
/// response untouched.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartAggregate {
    /// Lines in cart order.
    pub lines: Vec<LineView>,
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Server-supplied fee fields.
    pub fees: FeeSummary,
}

impl CartAggregate {
    /// Derive the aggregate for `lines`.
    pub fn compute(lines: &[CartLine], fees: &FeeSummary, currency: Currency) -> Self {
        let lines: Vec<LineView> = lines
            .iter()
            .map(|line| LineView {
                quote: line.quote(),
                total: line.total(),
                line: line.clone(),
            })
            .collect();
        let item_count = lines.iter().map(|v| u64::from(v.line.quantity)).sum();
        let subtotal = Money::saturating_sum(lines.iter().map(|v| v.total), currency);

        Self {
            lines,
            item_count,
            subtotal,
            fees: fees.clone(),
        }
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total savings against reference prices.
    pub fn savings(&self) -> Money {
        Money::saturating_sum(
            self.lines.iter().map(|v| {
                let unit = v.quote.savings();
                unit.try_multiply(i64::from(v.line.quantity)).unwrap_or(unit)
            }),
            self.subtotal.currency,
        )
    }

    /// Amount still needed to reach the server's free-delivery threshold.
    ///
    /// `None` when the server sent no threshold or it is already reached.
    pub fn free_delivery_remaining(&self) -> Option<Money> {
        let threshold = self.fees.free_delivery_threshold?;
        let remaining = threshold.amount_minor - self.subtotal.amount_minor;
        (remaining > 0).then(|| Money::new(remaining, threshold.currency))
    }
}
