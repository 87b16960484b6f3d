//! Order history commands, read from wherever checkout sends orders.

use anyhow::{bail, Context as _, Result};
use stuffies_commerce::checkout::OrderSummary;
use stuffies_commerce::OrderId;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::{status_badge, variant_label};

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(OrdersCommand::List) {
        OrdersCommand::List => list(ctx).await,
        OrdersCommand::Show { order_id } => show(&order_id, ctx).await,
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let source = ctx.orders()?;
    let spinner = ctx.output.spinner("Cargando órdenes...");
    let orders = source.list().await;
    spinner.finish_and_clear();
    let orders = orders.with_context(|| format!("Failed to list orders from {}", source.location()))?;

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Órdenes");
    if orders.is_empty() {
        ctx.output.info("No hay órdenes registradas.");
        ctx.output.info("Run `stuffies checkout` to place one.");
        return Ok(());
    }

    let widths = [18, 27, 24, 12, 12];
    ctx.output
        .table_row(&["ID", "FECHA", "CLIENTE", "TOTAL", "ESTADO"], &widths);
    for order in &orders {
        ctx.output.table_row(
            &[
                order.id.as_str(),
                order.fecha.as_deref().unwrap_or("-"),
                order.nombre.as_deref().unwrap_or("Cliente"),
                &order.total.to_string(),
                &status_badge(order.estado),
            ],
            &widths,
        );
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} orden(es)", orders.len()));
    Ok(())
}

async fn show(order_id: &str, ctx: &Context) -> Result<()> {
    let Some(order) = ctx.orders()?.get(&OrderId::new(order_id)).await? else {
        bail!("Order '{}' not found", order_id);
    };

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }
    print_receipt(&order, ctx);
    Ok(())
}

fn print_receipt(order: &OrderSummary, ctx: &Context) {
    let missing = "(no informado)";
    ctx.output.header(&format!("Boleta #{}", order.id));
    ctx.output.kv("Nombre", order.nombre.as_deref().unwrap_or(missing));
    ctx.output.kv("Email", order.email.as_deref().filter(|e| !e.is_empty()).unwrap_or(missing));
    ctx.output.kv("Dirección", order.direccion.as_deref().unwrap_or(missing));
    ctx.output.kv("Teléfono", order.telefono.as_deref().unwrap_or(missing));
    ctx.output.kv("Fecha de compra", order.fecha.as_deref().unwrap_or("(sin fecha)"));

    ctx.output.info("");
    for line in &order.items {
        ctx.output.list_item(&format!(
            "{} ({}) x{}  {}",
            line.nombre,
            variant_label(line.talla.as_deref(), line.color.as_deref()),
            line.cantidad,
            line.subtotal()
        ));
    }

    ctx.output.info("");
    ctx.output.kv("Total", &order.total.to_string());
    ctx.output.kv("Estado", &status_badge(order.estado));
    if let Some(ref medio) = order.medio_pago {
        ctx.output.kv("Medio de pago", medio);
    }
}
