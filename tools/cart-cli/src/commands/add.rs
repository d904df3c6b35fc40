//! Add a product to the cart.

use anyhow::Result;
use cart_model::VariantSelector;

use super::{settle, AddArgs};
use crate::context::Context;
use crate::output::outcome_badge;

/// Run the add command.
pub async fn run(args: AddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let product = ctx.find_product(&args.product, &store.lines())?;
    let selector = match (args.variant, args.no_variant) {
        (Some(key), _) => Some(VariantSelector::Key(key)),
        (None, true) => Some(VariantSelector::NoVariant),
        (None, false) => None,
    };

    for _ in 0..args.quantity.max(1) {
        let outcome = settle(
            ctx,
            store
                .add_item(product.clone(), selector.clone(), None)
                .await,
        )?;
        ctx.output.debug(&format!("add: {}", outcome_badge(outcome)));
    }

    ctx.output.success(&format!(
        "{} in cart: {}",
        product.name,
        store.quantity_of(&args.product, None)
    ));
    super::show::render(ctx, &store);
    Ok(())
}
