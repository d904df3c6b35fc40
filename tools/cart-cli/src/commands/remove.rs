//! Remove a product from the cart.

use anyhow::Result;
use cart_sync::MutationOutcome;

use super::{settle, variant_arg, RemoveArgs};
use crate::context::Context;
use crate::output::outcome_badge;

/// Run the remove command.
pub async fn run(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let variant = variant_arg(args.variant.as_deref());

    let outcome = settle(ctx, store.remove_item(&args.product, variant.as_ref()).await)?;
    match outcome {
        MutationOutcome::NotFound => {
            ctx.output
                .warn(&format!("'{}' is not in the cart", args.product));
        }
        _ => ctx.output.success(&format!(
            "Removed '{}' ({})",
            args.product,
            outcome_badge(outcome)
        )),
    }

    super::show::render(ctx, &store);
    Ok(())
}
