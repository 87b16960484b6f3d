//! Catalog commands.

use anyhow::{Context as _, Result};
use stuffies_commerce::catalog::{categories, CatalogSource, Product};
use stuffies_commerce::ProductId;

use super::{CatalogArgs, CatalogCommand};
use crate::context::Context;

/// Units at or below which a product is flagged as low on stock.
const LOW_STOCK: u64 = 5;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let command = args.command.unwrap_or(CatalogCommand::List {
        categoria: None,
        all: false,
    });
    let catalog = ctx.catalog()?;
    ctx.output
        .debug(&format!("Reading catalog from {}", catalog.location()));

    let spinner = ctx.output.spinner("Cargando catálogo...");
    let products = catalog.list_products().await;
    spinner.finish_and_clear();
    let products = products.context("Failed to load catalog")?;

    match command {
        CatalogCommand::List { categoria, all } => list(products, categoria.as_deref(), all, ctx),
        CatalogCommand::Show { product_id } => show(products, &product_id, ctx),
        CatalogCommand::Categories => {
            let names = categories(&products);
            if ctx.output.is_json() {
                ctx.output.json(&names);
            } else {
                ctx.output.header("Categorías");
                names.iter().for_each(|c| ctx.output.list_item(c));
            }
            Ok(())
        }
    }
}

fn list(products: Vec<Product>, categoria: Option<&str>, all: bool, ctx: &Context) -> Result<()> {
    let products: Vec<Product> = products
        .into_iter()
        .filter(|p| all || p.activo)
        .filter(|p| match categoria {
            Some(wanted) => p
                .categoria
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header("Catálogo");
    if products.is_empty() {
        ctx.output.info("No hay productos.");
        return Ok(());
    }

    let widths = [8, 30, 14, 12, 10];
    ctx.output
        .table_row(&["ID", "NOMBRE", "CATEGORÍA", "PRECIO", "STOCK"], &widths);
    for p in &products {
        ctx.output.table_row(
            &[
                p.id.as_str(),
                &p.nombre,
                p.categoria.as_deref().unwrap_or("-"),
                &p.precio.to_string(),
                &stock_label(p),
            ],
            &widths,
        );
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} producto(s)", products.len()));
    Ok(())
}

fn show(products: Vec<Product>, product_id: &str, ctx: &Context) -> Result<()> {
    let id = ProductId::new(product_id);
    let Some(product) = products.into_iter().find(|p| p.id == id) else {
        anyhow::bail!("Product not found: {}", product_id);
    };

    if ctx.output.is_json() {
        ctx.output.json(&product);
        return Ok(());
    }

    ctx.output.header(&product.nombre);
    ctx.output.kv("id", product.id.as_str());
    ctx.output.kv("precio", &product.precio.to_string());
    if let Some(ref categoria) = product.categoria {
        ctx.output.kv("categoría", categoria);
    }
    if let Some(ref descripcion) = product.descripcion {
        ctx.output.kv("descripción", descripcion);
    }
    if let Some(ref imagen) = product.imagen {
        ctx.output.kv("imagen", imagen);
    }
    if !product.colores.is_empty() {
        ctx.output.kv("colores", &product.colores.join(", "));
    }

    let sizes = product.available_sizes();
    if !sizes.is_empty() {
        ctx.output.info("");
        ctx.output.info("Stock por talla:");
        let stock = product.stock();
        for talla in sizes {
            let units = stock
                .available_for(Some(talla))
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            ctx.output.kv(talla, &units);
        }
    }
    ctx.output.kv("stock", &stock_label(&product));
    Ok(())
}

fn stock_label(product: &Product) -> String {
    if product.variants.is_empty() {
        return "-".to_string();
    }
    let stock = product.stock();
    if stock.is_sold_out() {
        "agotado".to_string()
    } else if stock.is_low_stock(LOW_STOCK) {
        format!("{} (bajo)", stock.total())
    } else {
        stock.total().to_string()
    }
}
