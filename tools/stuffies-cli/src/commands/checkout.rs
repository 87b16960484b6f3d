//! Checkout command.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use stuffies_commerce::checkout::{account_contact, place_order, CustomerForm};
use stuffies_commerce::CheckoutError;

use super::CheckoutArgs;
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let store = ctx.cart_store()?;
    let account = account_contact(&ctx.session()?);
    let orders = ctx.orders()?;
    let form = CustomerForm::new(args.nombre, args.direccion, args.comuna, args.telefono);

    let totals = store.get_cart_totals();
    if !args.yes && !ctx.output.is_json() && totals.cantidad > 0 {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "¿Pagar {} por {} producto(s)?",
                totals.subtotal, totals.cantidad
            ))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelado.");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Registrando la compra...");
    let result = place_order(&store, &orders, &form, &account).await;
    spinner.finish_and_clear();

    let receipt = match result {
        Ok(receipt) => receipt,
        Err(CheckoutError::Invalid(errors)) => {
            ctx.output.warn("Revisa los campos marcados:");
            for e in errors.iter() {
                ctx.output.kv(e.field.as_str(), e.message);
            }
            if ctx.output.is_json() {
                ctx.output.json(&errors);
            }
            bail!("Invalid customer details");
        }
        Err(e) => return Err(e.into()),
    };

    if ctx.output.is_json() {
        ctx.output.json(&receipt);
        return Ok(());
    }

    ctx.output.success("¡Compra registrada!");
    match receipt.order_id {
        Some(ref id) => {
            ctx.output.kv("orden", id.as_str());
            ctx.output.info(&format!("Ver boleta: stuffies orders show {}", id));
        }
        None => ctx.output.kv("orden", "-"),
    }
    ctx.output.kv("registrada en", &orders.location());
    Ok(())
}
