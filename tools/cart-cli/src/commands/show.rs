//! Show the cart.

use anyhow::Result;
use cart_sync::CartStore;

use crate::context::Context;
use crate::output::{format_fee, format_price};

/// Run the show command.
pub async fn run(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    render(ctx, &store);
    Ok(())
}

/// Print the cart and its totals.
pub fn render(ctx: &Context, store: &CartStore) {
    let cart = store.aggregate();
    if ctx.output.is_json() {
        ctx.output.json(&cart);
        return;
    }

    ctx.output.header("Cart");
    if cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return;
    }

    let widths = [24, 12, 5, 28, 12];
    ctx.output
        .table_row(&["PRODUCT", "VARIANT", "QTY", "PRICE", "TOTAL"], &widths);
    for view in &cart.lines {
        let variant = view
            .line
            .variant
            .as_ref()
            .and_then(|v| v.title.as_deref().or(v.discriminator()))
            .unwrap_or("-");
        let quantity = view.line.quantity.to_string();
        let price = format_price(
            view.quote.display,
            view.quote.reference,
            view.quote.discount_percent,
        );
        let total = view.total.display();
        ctx.output.table_row(
            &[
                view.line.product.name.as_str(),
                variant,
                quantity.as_str(),
                price.as_str(),
                total.as_str(),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.kv("Items", &cart.item_count.to_string());
    ctx.output.kv("Subtotal", &cart.subtotal.display());
    let savings = cart.savings();
    if savings.is_positive() {
        ctx.output.kv("You save", &savings.display());
    }
    ctx.output.kv("Delivery", &format_fee(cart.fees.delivery_fee));
    ctx.output.kv("Platform fee", &format_fee(cart.fees.platform_fee));
    if let Some(remaining) = cart.free_delivery_remaining() {
        ctx.output.kv(
            "Free delivery",
            &format!("add {} more", remaining.display()),
        );
    }
    if !store.is_authenticated() {
        ctx.output.debug("Guest cart, stored locally only");
    }
}
