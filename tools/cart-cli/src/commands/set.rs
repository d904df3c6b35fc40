//! Set the quantity of a product in the cart.

use anyhow::Result;
use cart_sync::MutationOutcome;

use super::{settle, variant_arg, SetArgs};
use crate::context::Context;
use crate::output::outcome_badge;

/// Run the set command.
pub async fn run(args: SetArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let variant = variant_arg(args.variant.as_deref());

    let outcome = settle(
        ctx,
        store
            .update_quantity(&args.product, args.quantity, variant.as_ref())
            .await,
    )?;
    if outcome == MutationOutcome::NotFound {
        ctx.output
            .warn(&format!("'{}' is not in the cart; use `cart add` first", args.product));
    } else {
        ctx.output.success(&format!(
            "'{}' set to {} ({})",
            args.product,
            args.quantity.max(0),
            outcome_badge(outcome)
        ));
    }

    super::show::render(ctx, &store);
    Ok(())
}
