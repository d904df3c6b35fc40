//! CLI command implementations.

pub mod add;
pub mod clear;
pub mod refresh;
pub mod remove;
pub mod set;
pub mod show;

use anyhow::Result;
use cart_model::VariantRef;
use cart_sync::{CartError, MutationOutcome};
use clap::Args;

use crate::context::Context;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product id (public or storage id).
    pub product: String,

    /// Variant id or title (default: the product's first variant).
    #[arg(long, conflicts_with = "no_variant")]
    pub variant: Option<String>,

    /// Add the bare product even if it has variants.
    #[arg(long)]
    pub no_variant: bool,

    /// Number of units to add; adds one unit per request.
    #[arg(short = 'n', long, default_value = "1")]
    pub quantity: u32,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Product id (public or storage id).
    pub product: String,

    /// Variant id or title (default: any variant).
    #[arg(long)]
    pub variant: Option<String>,
}

/// Arguments for the set command.
#[derive(Args)]
pub struct SetArgs {
    /// Product id (public or storage id).
    pub product: String,

    /// New quantity; zero or less removes the line.
    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,

    /// Variant id or title (default: any variant).
    #[arg(long)]
    pub variant: Option<String>,
}

/// Arguments for the refresh command.
#[derive(Args)]
pub struct RefreshArgs {
    /// Latitude for fee computation.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for fee computation.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
}

/// A variant given on the command line may be an id or a title.
pub fn variant_arg(variant: Option<&str>) -> Option<VariantRef> {
    VariantRef::from_parts(variant, variant)
}

/// Report a failed mutation with its user-facing message.
pub fn settle(
    ctx: &Context,
    result: Result<MutationOutcome, CartError>,
) -> Result<MutationOutcome> {
    result.map_err(|e| {
        ctx.output.warn(&e.user_message());
        anyhow::Error::new(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_arg_matches_id_or_title() {
        let arg = variant_arg(Some("500 g")).unwrap();
        assert!(arg.matches(&VariantRef::by_title("500 g")));
        assert!(arg.matches(&VariantRef::by_id("500 g")));
        assert!(variant_arg(None).is_none());
        assert!(variant_arg(Some(" ")).is_none());
    }
}
