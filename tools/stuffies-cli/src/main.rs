//! Stuffies CLI - the storefront's cart and checkout from the terminal.
//!
//! Commands:
//! - `stuffies catalog` - Browse the catalog (local file or the storefront API)
//! - `stuffies cart` - List, add, update, remove and clear cart lines
//! - `stuffies checkout` - Place an order for the cart
//! - `stuffies orders` - Read placed orders back as receipts
//! - `stuffies config` - Manage configuration

mod backend;
mod commands;
mod config;
mod context;
mod local;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{CartArgs, CatalogArgs, CheckoutArgs, ConfigArgs, OrdersArgs};

/// Stuffies CLI - Shop the Stuffies catalog from the terminal
#[derive(Parser)]
#[command(name = "stuffies")]
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
    /// Browse the catalog
    Catalog(CatalogArgs),

    /// Manage the shopping cart
    Cart(CartArgs),

    /// Place an order for the current cart
    Checkout(CheckoutArgs),

    /// List placed orders
    Orders(OrdersArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Log to stderr. `RUST_LOG` wins over the config file's filter; `--verbose`
/// raises this crate's own logs to debug.
fn init_tracing(ctx: &context::Context) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = ctx.config.logging.filter.clone();
        if ctx.output.is_verbose() {
            directives.push_str(",stuffies_commerce=debug,stuffies_cache=debug,stuffies_data=debug");
        }
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), output)?;
    init_tracing(&ctx);

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
