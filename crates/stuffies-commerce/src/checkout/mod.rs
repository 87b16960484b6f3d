//! Checkout: customer details, order payloads and order placement.

mod customer;
#[cfg(feature = "storage")]
mod flow;
mod order;
mod sink;

pub use customer::{CustomerField, CustomerForm, FieldError, ValidationErrors};
#[cfg(feature = "storage")]
pub use flow::{account_contact, place_order};
pub use order::{
    normalize_order, normalize_order_list, AccountContact, Cliente, OrderItem, OrderLine,
    OrderPayload, OrderReceipt, OrderStatus, OrderSummary, PaymentMethod,
};
pub use sink::OrderSink;
