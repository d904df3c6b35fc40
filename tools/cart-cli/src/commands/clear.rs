//! Empty the cart.

use anyhow::Result;
use cart_sync::MutationOutcome;

use super::settle;
use crate::context::Context;
use crate::output::outcome_badge;

/// Run the clear command.
pub async fn run(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;

    let outcome = settle(ctx, store.clear_cart().await)?;
    if outcome == MutationOutcome::Refreshed {
        ctx.output
            .warn("The server did not confirm the clear; showing the server's cart");
    } else {
        ctx.output
            .success(&format!("Cart cleared ({})", outcome_badge(outcome)));
    }

    super::show::render(ctx, &store);
    Ok(())
}
