//! Order placement.

use stuffies_cache::Session;

use crate::cart::{Cart, CartStore};
use crate::checkout::{AccountContact, CustomerForm, OrderPayload, OrderReceipt, OrderSink};
use crate::error::CheckoutError;

/// Name and email of the signed-in account, if a session is stored.
pub fn account_contact(session: &Session) -> AccountContact {
    match session.profile() {
        Some(profile) => AccountContact {
            nombre: profile.display_name().map(String::from),
            email: profile.email.clone().filter(|e| !e.is_empty()),
        },
        None => AccountContact::default(),
    }
}

/// Submit the current cart as an order.
///
/// The cart is cleared only after the sink accepted the order. Any failure
/// leaves it untouched.
pub async fn place_order<S>(
    store: &CartStore,
    sink: &S,
    form: &CustomerForm,
    account: &AccountContact,
) -> Result<OrderReceipt, CheckoutError>
where
    S: OrderSink + ?Sized,
{
    let cart = Cart::from_items(store.get_cart());
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    form.validate().map_err(CheckoutError::Invalid)?;

    let payload = OrderPayload::from_cart(&cart, form, account);
    let receipt = match sink.create_order(&payload).await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::warn!(error = %e, lines = cart.len(), "order submission failed");
            return Err(CheckoutError::Submission(e));
        }
    };

    store.clear_cart();
    tracing::info!(
        order_id = ?receipt.order_id,
        lines = payload.items.len(),
        total = %payload.total,
        "order placed"
    );
    Ok(receipt)
}
