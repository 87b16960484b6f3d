//! Orders: the payload sent at checkout and the records read back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cart::{Cart, CartLineItem};
use crate::catalog::{first_text, stock_count, text};
use crate::checkout::CustomerForm;
use crate::ids::{id_from_json, OrderId, ProductId};
use crate::money::{money_from_json, Money};

/// Order status as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pendiente,
    /// Web checkout records orders as paid.
    #[default]
    Pagado,
    Enviado,
    Entregado,
    Cancelado,
    #[serde(other)]
    Desconocido,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "PENDIENTE",
            OrderStatus::Pagado => "PAGADO",
            OrderStatus::Enviado => "ENVIADO",
            OrderStatus::Entregado => "ENTREGADO",
            OrderStatus::Cancelado => "CANCELADO",
            OrderStatus::Desconocido => "DESCONOCIDO",
        }
    }

    /// Case-insensitive parse; unknown labels map to `Desconocido`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PENDIENTE" => OrderStatus::Pendiente,
            "PAGADO" => OrderStatus::Pagado,
            "ENVIADO" => OrderStatus::Enviado,
            "ENTREGADO" => OrderStatus::Entregado,
            "CANCELADO" => OrderStatus::Cancelado,
            _ => OrderStatus::Desconocido,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    #[default]
    Web,
    #[serde(other)]
    Otro,
}

/// Name and email known from the signed-in account, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountContact {
    pub nombre: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    pub nombre: String,
    pub email: String,
    pub direccion: String,
    pub telefono: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub nombre: String,
    pub talla: Option<String>,
    pub color: Option<String>,
    pub precio: Money,
    pub cantidad: u32,
    pub imagen: Option<String>,
}

impl From<&CartLineItem> for OrderItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            nombre: item.nombre.clone(),
            talla: item.talla.clone(),
            color: item.color.clone(),
            precio: item.precio,
            cantidad: item.cantidad,
            imagen: item.imagen.clone(),
        }
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub cliente: Cliente,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub estado: OrderStatus,
    pub medio_pago: PaymentMethod,
}

impl OrderPayload {
    /// Build the payload for a cart.
    ///
    /// The account's name and email win over the form's name; the address
    /// is sent as `"<direccion>, <comuna>"`.
    pub fn from_cart(cart: &Cart, form: &CustomerForm, account: &AccountContact) -> Self {
        let nombre = account
            .nombre
            .clone()
            .unwrap_or_else(|| form.nombre.trim().to_string());
        Self {
            cliente: Cliente {
                nombre,
                email: account.email.clone().unwrap_or_default(),
                direccion: form.full_address(),
                telefono: form.telefono.trim().to_string(),
            },
            items: cart.items().iter().map(OrderItem::from).collect(),
            total: cart.totals().subtotal,
            estado: OrderStatus::Pagado,
            medio_pago: PaymentMethod::Web,
        }
    }
}

/// What the order service answered.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OrderReceipt {
    pub order_id: Option<OrderId>,
    #[serde(skip)]
    pub raw: Value,
}

impl OrderReceipt {
    pub fn new(order_id: Option<OrderId>) -> Self {
        Self {
            order_id,
            raw: Value::Null,
        }
    }

    /// Read the id from `id`, falling back to `orderId`.
    pub fn from_response(raw: Value) -> Self {
        let order_id = ["id", "orderId"]
            .iter()
            .find_map(|f| raw.get(*f).and_then(id_from_json))
            .map(OrderId::new);
        Self { order_id, raw }
    }
}

/// A line of a stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub nombre: String,
    pub talla: Option<String>,
    pub color: Option<String>,
    pub precio: Money,
    pub cantidad: u64,
}

impl OrderLine {
    pub fn subtotal(&self) -> Money {
        let units = u32::try_from(self.cantidad).unwrap_or(u32::MAX);
        self.precio.try_multiply(units).unwrap_or(Money::new(i64::MAX))
    }
}

/// An order as read back from the order service, for receipts and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub fecha: Option<String>,
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub items: Vec<OrderLine>,
    pub total: Money,
    pub estado: OrderStatus,
    pub medio_pago: Option<String>,
}

/// Read a stored order in any of the shapes the backend has returned.
///
/// Customer fields come from the flat `cliente*` columns, then the nested
/// `cliente` object, then the linked `user`. Returns `None` without an id.
pub fn normalize_order(raw: &Value) -> Option<OrderSummary> {
    let obj = raw.as_object()?;
    let id = OrderId::new(id_from_json(obj.get("id")?)?);

    let nested = |outer: &str, field: &str| text(obj.get(outer).and_then(|o| o.get(field)));
    let customer = |flat: &str, field: &str| {
        text(obj.get(flat))
            .or_else(|| nested("cliente", field))
            .or_else(|| nested("user", field))
    };

    let items = obj
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_order_line).collect())
        .unwrap_or_default();

    Some(OrderSummary {
        id,
        fecha: first_text(obj, &["fechaCreacion", "createdAt"]),
        nombre: customer("clienteNombre", "nombre"),
        email: customer("clienteEmail", "email"),
        direccion: customer("clienteDireccion", "direccion"),
        telefono: customer("clienteTelefono", "telefono"),
        items,
        total: obj.get("total").and_then(money_from_json).unwrap_or_default(),
        estado: first_text(obj, &["estado", "status"])
            .map(|s| OrderStatus::parse(&s))
            .unwrap_or_default(),
        medio_pago: first_text(obj, &["medioPago"]),
    })
}

fn normalize_order_line(raw: &Value) -> Option<OrderLine> {
    let obj = raw.as_object()?;
    let nombre = text(obj.get("product").and_then(|p| p.get("nombre")))
        .or_else(|| text(obj.get("nombre")))
        .unwrap_or_else(|| "Producto".to_string());
    Some(OrderLine {
        nombre,
        talla: text(obj.get("talla")),
        color: text(obj.get("color")),
        precio: obj.get("precio").and_then(money_from_json).unwrap_or_default(),
        cantidad: obj.get("cantidad").map(stock_count).unwrap_or(0),
    })
}

/// A list of orders, as an array or a paged `{ "content": [...] }`.
pub fn normalize_order_list(raw: &Value) -> Vec<OrderSummary> {
    let list = raw
        .as_array()
        .or_else(|| raw.get("content").and_then(Value::as_array));
    list.map(|orders| orders.iter().filter_map(normalize_order).collect())
        .unwrap_or_default()
}
