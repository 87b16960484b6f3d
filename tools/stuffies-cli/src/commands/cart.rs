//! Cart commands.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use stuffies_commerce::cart::{AddOptions, CartStore, CartTotals, LineIdentity, VariantSelection};
use stuffies_commerce::catalog::CatalogSource;
use stuffies_commerce::ProductId;

use super::{CartArgs, CartCommand, VariantArgs};
use crate::context::Context;
use crate::output::line_label;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let store = ctx.cart_store()?;
    match args.command.unwrap_or(CartCommand::List) {
        CartCommand::List => list(&store, ctx),
        CartCommand::Add {
            product_id,
            variant,
            cantidad,
            force,
        } => add(&store, &product_id, variant, cantidad, force, ctx).await,
        CartCommand::Update {
            product_id,
            cantidad,
            variant,
        } => update(&store, &product_id, cantidad, variant, ctx),
        CartCommand::Remove {
            product_id,
            variant,
        } => remove(&store, &product_id, variant, ctx),
        CartCommand::Clear { yes } => clear(&store, yes, ctx),
        CartCommand::Totals => totals(&store, ctx),
    }
}

fn identity(product_id: &str, variant: VariantArgs) -> LineIdentity {
    LineIdentity::new(
        product_id,
        VariantSelection::new(variant.talla.as_deref(), variant.color.as_deref()),
    )
}

fn list(store: &CartStore, ctx: &Context) -> Result<()> {
    let items = store.get_cart();

    if ctx.output.is_json() {
        ctx.output.json(&items);
        return Ok(());
    }

    ctx.output.header("Carrito");
    if items.is_empty() {
        ctx.output.info("Tu carrito está vacío.");
        return Ok(());
    }

    let widths = [8, 28, 12, 6, 12, 12];
    ctx.output
        .table_row(&["ID", "PRODUCTO", "VARIANTE", "CANT", "PRECIO", "SUBTOTAL"], &widths);
    for item in &items {
        ctx.output.table_row(
            &[
                item.product_id.as_str(),
                &item.nombre,
                &line_label(item),
                &item.cantidad.to_string(),
                &item.precio.to_string(),
                &item.line_total().to_string(),
            ],
            &widths,
        );
    }
    print_totals(&store.get_cart_totals(), ctx);
    Ok(())
}

async fn add(
    store: &CartStore,
    product_id: &str,
    variant: VariantArgs,
    cantidad: u32,
    force: bool,
    ctx: &Context,
) -> Result<()> {
    let catalog = ctx.catalog()?;
    let product = catalog
        .get_product(&ProductId::new(product_id))
        .await
        .with_context(|| format!("Failed to look up product {} in {}", product_id, catalog.location()))?;

    // Missing choices fall back to the product's first size and color.
    let defaults = product.default_selection();
    let selection = VariantSelection::new(
        variant.talla.as_deref().or(defaults.talla.as_deref()),
        variant.color.as_deref().or(defaults.color.as_deref()),
    );
    let opts = AddOptions::new().selection(selection).cantidad(cantidad);

    let line = if force || product.variants.is_empty() {
        if !force {
            ctx.output
                .warn("El catálogo no informa stock para este producto; se agrega sin validar.");
        }
        store.add_to_cart(product.snapshot(), opts)
    } else {
        store.add_within_stock(product.snapshot(), opts, &product.variants)?
    };

    if ctx.output.is_json() {
        ctx.output.json(&line);
        return Ok(());
    }
    ctx.output.success(&format!(
        "{} ({}) x{} en el carrito",
        line.nombre,
        line_label(&line),
        line.cantidad
    ));
    print_totals(&store.get_cart_totals(), ctx);
    Ok(())
}

fn update(
    store: &CartStore,
    product_id: &str,
    cantidad: i64,
    variant: VariantArgs,
    ctx: &Context,
) -> Result<()> {
    let identity = identity(product_id, variant);
    store.update_quantity(&identity, cantidad);

    let cart = store.get_cart();
    match cart.iter().find(|i| i.is(&identity)) {
        Some(line) => ctx
            .output
            .success(&format!("{} ({}) ahora x{}", line.nombre, line_label(line), line.cantidad)),
        None => ctx.output.warn("Ese producto no está en el carrito."),
    }
    totals(store, ctx)
}

fn remove(store: &CartStore, product_id: &str, variant: VariantArgs, ctx: &Context) -> Result<()> {
    let identity = identity(product_id, variant);
    let before = store.get_cart().len();
    store.remove_from_cart(&identity);

    if store.get_cart().len() < before {
        ctx.output.success("Producto eliminado del carrito.");
    } else {
        ctx.output.warn("Ese producto no está en el carrito.");
    }
    totals(store, ctx)
}

fn clear(store: &CartStore, yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("¿Vaciar el carrito?")
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelado.");
            return Ok(());
        }
    }

    store.clear_cart();
    ctx.output.success("Carrito vaciado.");
    totals(store, ctx)
}

fn totals(store: &CartStore, ctx: &Context) -> Result<()> {
    let totals = store.get_cart_totals();
    if ctx.output.is_json() {
        ctx.output.json(&totals);
    } else {
        print_totals(&totals, ctx);
    }
    Ok(())
}

fn print_totals(totals: &CartTotals, ctx: &Context) {
    ctx.output.info("");
    ctx.output.kv("Productos", &totals.cantidad.to_string());
    ctx.output.kv("Subtotal", &totals.subtotal.to_string());
}
