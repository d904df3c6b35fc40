//! Reload the cart from the server.

use anyhow::{bail, Result};
use cart_sync::GeoPoint;

use super::RefreshArgs;
use crate::context::Context;

/// Run the refresh command.
pub async fn run(args: RefreshArgs, ctx: &Context) -> Result<()> {
    if !ctx.config.has_gateway() {
        bail!("No cart API configured. Set gateway.base_url in cart.toml or CART_API_URL.");
    }
    let store = ctx.store()?;
    let geo = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    };

    if let Err(e) = store.refresh(geo).await {
        ctx.output.warn(&e.user_message());
        return Err(e.into());
    }
    ctx.output.success("Cart refreshed from the server");

    super::show::render(ctx, &store);
    Ok(())
}
