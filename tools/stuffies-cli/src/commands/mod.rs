//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod orders;

use clap::{Args, Subcommand};

/// Size and color picked for a cart line.
#[derive(Args, Debug, Clone, Default)]
pub struct VariantArgs {
    /// Size.
    #[arg(short, long)]
    pub talla: Option<String>,

    /// Color.
    #[arg(short = 'C', long)]
    pub color: Option<String>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// List the cart's lines.
    List,
    /// Add a catalog product.
    Add {
        /// Product ID.
        product_id: String,

        #[command(flatten)]
        variant: VariantArgs,

        /// Units to add.
        #[arg(short = 'n', long, default_value = "1")]
        cantidad: u32,

        /// Skip the stock check.
        #[arg(long)]
        force: bool,
    },
    /// Set a line's quantity (values below 1 become 1).
    Update {
        /// Product ID.
        product_id: String,

        /// New quantity.
        #[arg(allow_hyphen_values = true)]
        cantidad: i64,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        product_id: String,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show item count and subtotal.
    Totals,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: Option<CatalogCommand>,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List products.
    List {
        /// Only this category.
        #[arg(long)]
        categoria: Option<String>,

        /// Include inactive products.
        #[arg(long)]
        all: bool,
    },
    /// Show one product with stock per size.
    Show {
        /// Product ID.
        product_id: String,
    },
    /// List categories.
    Categories,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Full name.
    #[arg(long)]
    pub nombre: String,

    /// Street address.
    #[arg(long)]
    pub direccion: String,

    /// Commune.
    #[arg(long)]
    pub comuna: String,

    /// Mobile phone, e.g. +56912345678.
    #[arg(long)]
    pub telefono: String,

    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List placed orders.
    List,
    /// Show an order as a receipt.
    Show {
        /// Order ID.
        order_id: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
