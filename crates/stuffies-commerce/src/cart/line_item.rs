//! Cart line items and their identity.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Deserializer, Serialize};

/// Size label the storefront uses for a product sold in one size.
pub const ONE_SIZE: &str = "Única";
/// Color label the storefront uses for a product sold in one color.
pub const ONE_COLOR: &str = "Único";

/// Optional size and color chosen for a line.
///
/// `None` means the product has no such choice. The storefront's one-size
/// and one-color labels ([`ONE_SIZE`], [`ONE_COLOR`]) read as `None`, so
/// lines stored by older clients keep their identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VariantSelection {
    pub talla: Option<String>,
    pub color: Option<String>,
}

impl VariantSelection {
    /// No size, no color.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(talla: Option<&str>, color: Option<&str>) -> Self {
        Self {
            talla: clean(talla, ONE_SIZE),
            color: clean(color, ONE_COLOR),
        }
    }

    pub fn with_talla(mut self, talla: impl AsRef<str>) -> Self {
        self.talla = clean(Some(talla.as_ref()), ONE_SIZE);
        self
    }

    pub fn with_color(mut self, color: impl AsRef<str>) -> Self {
        self.color = clean(Some(color.as_ref()), ONE_COLOR);
        self
    }

    /// Re-apply trimming and label folding to fields set directly.
    pub fn normalized(self) -> Self {
        Self::new(self.talla.as_deref(), self.color.as_deref())
    }
}

fn clean(value: Option<&str>, placeholder: &str) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !is_placeholder(v, placeholder))
        .map(String::from)
}

/// Case-insensitive, with or without the accent.
fn is_placeholder(value: &str, placeholder: &str) -> bool {
    let fold = |s: &str| s.to_lowercase().replace('ú', "u");
    fold(value) == fold(placeholder)
}

/// What decides whether two lines are the same entity: product, size and
/// color must all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineIdentity {
    pub product_id: ProductId,
    pub selection: VariantSelection,
}

impl LineIdentity {
    pub fn new(product_id: impl Into<ProductId>, selection: VariantSelection) -> Self {
        Self {
            product_id: product_id.into(),
            selection: selection.normalized(),
        }
    }
}

/// The product fields a line keeps, copied at add time. Later catalog
/// changes do not reach lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub nombre: String,
    #[serde(deserialize_with = "non_negative")]
    pub precio: Money,
    pub imagen: Option<String>,
}

impl ProductSnapshot {
    pub fn new(id: impl Into<ProductId>, nombre: impl Into<String>, precio: Money) -> Self {
        Self {
            id: id.into(),
            nombre: nombre.into(),
            precio: precio.non_negative(),
            imagen: None,
        }
    }

    pub fn with_imagen(mut self, imagen: impl Into<String>) -> Self {
        self.imagen = Some(imagen.into());
        self
    }
}

/// Options for adding a product to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOptions {
    pub selection: VariantSelection,
    /// Units to add, at least 1.
    pub cantidad: u32,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(mut self, selection: VariantSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn talla(mut self, talla: impl AsRef<str>) -> Self {
        self.selection = self.selection.with_talla(talla);
        self
    }

    pub fn color(mut self, color: impl AsRef<str>) -> Self {
        self.selection = self.selection.with_color(color);
        self
    }

    /// Units to add. Zero is raised to 1.
    pub fn cantidad(mut self, cantidad: u32) -> Self {
        self.cantidad = cantidad.max(1);
        self
    }
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            selection: VariantSelection::none(),
            cantidad: 1,
        }
    }
}

/// One row of the cart.
///
/// Serialized with the field names the storefront has always stored, so a
/// cart written by an older client still loads. Run stored lines through
/// [`CartLineItem::normalized`] (as [`Cart::from_items`](crate::cart::Cart::from_items)
/// does) before comparing identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub nombre: String,
    /// Unit price at add time, never negative.
    #[serde(deserialize_with = "non_negative")]
    pub precio: Money,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(default)]
    pub talla: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Units, at least 1.
    pub cantidad: u32,
}

impl CartLineItem {
    pub fn new(snapshot: ProductSnapshot, selection: VariantSelection, cantidad: u32) -> Self {
        let selection = selection.normalized();
        Self {
            product_id: snapshot.id,
            nombre: snapshot.nombre,
            precio: snapshot.precio.non_negative(),
            imagen: snapshot.imagen,
            talla: selection.talla,
            color: selection.color,
            cantidad: cantidad.max(1),
        }
    }

    /// The same line with one-size/one-color labels folded, a negative price
    /// raised to zero and a zero quantity raised to 1.
    pub fn normalized(self) -> Self {
        let selection = self.selection().normalized();
        Self {
            precio: self.precio.non_negative(),
            talla: selection.talla,
            color: selection.color,
            cantidad: self.cantidad.max(1),
            ..self
        }
    }

    pub fn selection(&self) -> VariantSelection {
        VariantSelection {
            talla: self.talla.clone(),
            color: self.color.clone(),
        }
    }

    pub fn identity(&self) -> LineIdentity {
        LineIdentity::new(self.product_id.clone(), self.selection())
    }

    /// Check whether this line is the entity `identity` names.
    pub fn is(&self, identity: &LineIdentity) -> bool {
        self.product_id == identity.product_id
            && self.talla == identity.selection.talla
            && self.color == identity.selection.color
    }

    /// `precio * cantidad`, saturating on overflow.
    pub fn line_total(&self) -> Money {
        let saturated = if self.precio.is_negative() { i64::MIN } else { i64::MAX };
        self.precio
            .try_multiply(self.cantidad)
            .unwrap_or(Money::new(saturated))
    }
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    Money::deserialize(deserializer).map(Money::non_negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(talla: Option<&str>, color: Option<&str>) -> CartLineItem {
        CartLineItem::new(
            ProductSnapshot::new("1", "Polera", Money::new(1000)),
            VariantSelection::new(talla, color),
            1,
        )
    }

    #[test]
    fn test_identity_matching() {
        let a = item(Some("M"), None);
        assert!(a.is(&LineIdentity::new("1", VariantSelection::new(Some("M"), None))));
        assert!(!a.is(&LineIdentity::new("1", VariantSelection::new(Some("L"), None))));
        assert!(!a.is(&LineIdentity::new("1", VariantSelection::new(Some("M"), Some("Rojo")))));
        assert!(!a.is(&LineIdentity::new("2", VariantSelection::new(Some("M"), None))));
    }

    #[test]
    fn test_one_size_labels_read_as_no_choice() {
        let plain = item(None, None);
        assert_eq!(item(Some("Única"), Some("Único")).identity(), plain.identity());
        assert_eq!(item(Some(" unica "), Some("UNICO")).identity(), plain.identity());
        assert_ne!(item(Some("M"), None).identity(), plain.identity());

        let legacy = CartLineItem {
            talla: Some("Única".into()),
            color: Some("Rojo".into()),
            ..item(None, None)
        };
        assert!(legacy.normalized().is(&LineIdentity::new(
            "1",
            VariantSelection::none().with_color("Rojo")
        )));
    }

    #[test]
    fn test_negative_prices_clamp_to_zero() {
        let snapshot = ProductSnapshot::new("1", "Polera", Money::new(-500));
        assert_eq!(snapshot.precio, Money::ZERO);

        let line: CartLineItem = serde_json::from_str(
            r#"{"productId": 1, "nombre": "Polera", "precio": -990, "cantidad": 3}"#,
        )
        .unwrap();
        assert_eq!(line.precio, Money::ZERO);
        assert_eq!(line.line_total(), Money::ZERO);

        let snapshot: ProductSnapshot =
            serde_json::from_str(r#"{"id": 1, "nombre": "Polera", "precio": "-1", "imagen": null}"#)
                .unwrap();
        assert_eq!(snapshot.precio, Money::ZERO);
    }

    #[test]
    fn test_storage_field_names() {
        let json = serde_json::to_value(item(Some("M"), None)).unwrap();
        assert_eq!(json["productId"], "1");
        assert_eq!(json["precio"], 1000);
        assert_eq!(json["talla"], "M");
        assert!(json["color"].is_null());
        assert_eq!(json["cantidad"], 1);
    }

    #[test]
    fn test_loads_legacy_numeric_fields() {
        let line: CartLineItem = serde_json::from_str(
            r#"{"productId": 3, "nombre": "Gorro", "precio": "4990", "cantidad": 2}"#,
        )
        .unwrap();
        assert_eq!(line.product_id.as_str(), "3");
        assert_eq!(line.precio, Money::new(4990));
        assert_eq!(line.talla, None);
        assert_eq!(line.line_total(), Money::new(9980));
    }

    #[test]
    fn test_add_options_clamp() {
        assert_eq!(AddOptions::new().cantidad(0).cantidad, 1);
        let opts = AddOptions::new().talla(" M ").color("");
        assert_eq!(opts.selection.talla.as_deref(), Some("M"));
        assert_eq!(opts.selection.color, None);
    }
}
