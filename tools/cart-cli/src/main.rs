//! Cart CLI - Command line tool for a synchronized shopping cart.
//!
//! Commands:
//! - `cart show` - Show the cart and its totals
//! - `cart add` - Add a product
//! - `cart remove` - Remove a product
//! - `cart set` - Set a product's quantity
//! - `cart clear` - Empty the cart
//! - `cart refresh` - Reload the cart from the server

mod commands;
mod config;
mod context;
mod output;
mod transport;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, RefreshArgs, RemoveArgs, SetArgs};

/// Cart CLI - Inspect and edit a cart kept in sync with the cart API
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Remove a product from the cart
    Remove(RemoveArgs),

    /// Set the quantity of a product in the cart
    Set(SetArgs),

    /// Empty the cart
    Clear,

    /// Reload the cart from the server
    Refresh(RefreshArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cart_sync=debug,cart_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Show => commands::show::run(&ctx).await,
        Commands::Add(args) => commands::add::run(args, &ctx).await,
        Commands::Remove(args) => commands::remove::run(args, &ctx).await,
        Commands::Set(args) => commands::set::run(args, &ctx).await,
        Commands::Clear => commands::clear::run(&ctx).await,
        Commands::Refresh(args) => commands::refresh::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
