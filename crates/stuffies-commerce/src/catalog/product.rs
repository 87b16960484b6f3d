//! Canonical product shape and normalization of backend product JSON.
//!
//! The catalog API has grown several names for the same field over time
//! (`imageUrl`, `imagen`, `imagen1`, ...), sizes arrive either as a
//! comma-separated string or as an array, and stock counts are sometimes
//! strings. Everything is resolved here, once, so the rest of the crate
//! only ever sees [`Product`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cart::{ProductSnapshot, VariantSelection};
use crate::catalog::{StockLevels, Variant};
use crate::ids::{id_from_json, ProductId, VariantId};
use crate::money::{money_from_json, Money};

const IMAGE_FIELDS: &[&str] = &["imageUrl", "imagen", "imagen1"];
const HOVER_FIELDS: &[&str] = &["imagenHover", "hover"];
const HOVER_FALLBACK_FIELDS: &[&str] = &["imagen2", "imgHover", "img2"];

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub nombre: String,
    /// Unit price, never negative.
    pub precio: Money,
    pub descripcion: Option<String>,
    pub categoria: Option<String>,
    /// Main image reference.
    pub imagen: Option<String>,
    /// Image shown on hover in listings.
    pub imagen_hover: Option<String>,
    pub destacado: bool,
    pub activo: bool,
    /// Sizes offered, in display order.
    pub tallas: Vec<String>,
    /// Colors offered, in display order.
    pub colores: Vec<String>,
    pub galeria: Vec<String>,
    /// Stock per size. Empty when the catalog did not include variants.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Create a minimal active product.
    pub fn new(id: impl Into<ProductId>, nombre: impl Into<String>, precio: Money) -> Self {
        Self {
            id: id.into(),
            nombre: nombre.into(),
            precio: precio.non_negative(),
            descripcion: None,
            categoria: None,
            imagen: None,
            imagen_hover: None,
            destacado: false,
            activo: true,
            tallas: Vec::new(),
            colores: Vec::new(),
            galeria: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Stock view over this product's variants.
    pub fn stock(&self) -> StockLevels<'_> {
        StockLevels::new(&self.variants)
    }

    /// Sizes a shopper can pick: the declared sizes, or failing that the
    /// sizes that have a variant.
    pub fn available_sizes(&self) -> Vec<&str> {
        if !self.tallas.is_empty() {
            return self.tallas.iter().map(String::as_str).collect();
        }
        self.stock().sizes()
    }

    /// The selection a one-click "add to cart" uses: first size, first
    /// color, or none when the product has no such choice.
    pub fn default_selection(&self) -> VariantSelection {
        VariantSelection::new(
            self.available_sizes().first().copied(),
            self.colores.first().map(String::as_str),
        )
    }

    /// The part of the product a cart line keeps.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            nombre: self.nombre.clone(),
            precio: self.precio,
            imagen: self.imagen.clone(),
        }
    }
}

/// Turn one backend product object into a [`Product`].
///
/// Returns `None` for anything that is not an object with a usable id.
pub fn normalize_product(raw: &Value) -> Option<Product> {
    let obj = raw.as_object()?;
    let id = obj.get("id").and_then(id_from_json)?;

    let imagenes = string_list(obj.get("imagenes"));
    let galeria = string_list(obj.get("galeria"));

    let imagen = first_text(obj, IMAGE_FIELDS).or_else(|| imagenes.first().cloned());
    let imagen_hover = first_text(obj, HOVER_FIELDS)
        .or_else(|| galeria.get(1).cloned())
        .or_else(|| imagenes.get(1).cloned())
        .or_else(|| first_text(obj, HOVER_FALLBACK_FIELDS));

    let variants = obj
        .get("variants")
        .map(normalize_variants)
        .unwrap_or_default();

    Some(Product {
        id: ProductId::new(id),
        nombre: text(obj.get("nombre")).unwrap_or_default(),
        precio: obj
            .get("precio")
            .and_then(money_from_json)
            .unwrap_or(Money::ZERO)
            .non_negative(),
        descripcion: text(obj.get("descripcion")),
        categoria: text(obj.get("categoria")),
        imagen,
        imagen_hover,
        destacado: obj.get("destacado").and_then(Value::as_bool).unwrap_or(false),
        activo: obj.get("activo").and_then(Value::as_bool).unwrap_or(true),
        tallas: string_list(obj.get("tallas")),
        colores: string_list(obj.get("colores")),
        galeria,
        variants,
    })
}

/// Normalize a product listing. Accepts a bare array or a paged
/// `{ "content": [...] }` envelope; anything else is an empty catalog.
/// Entries that cannot be normalized are skipped.
pub fn normalize_product_list(raw: &Value) -> Vec<Product> {
    let entries = match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("content") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    entries.iter().filter_map(normalize_product).collect()
}

/// Normalize a variant list. Non-arrays yield no variants.
pub fn normalize_variants(raw: &Value) -> Vec<Variant> {
    raw.as_array()
        .map(|items| items.iter().filter_map(normalize_variant).collect())
        .unwrap_or_default()
}

fn normalize_variant(raw: &Value) -> Option<Variant> {
    let obj = raw.as_object()?;
    Some(Variant {
        id: obj.get("id").and_then(id_from_json).map(VariantId::new),
        talla: text(obj.get("talla")),
        stock: obj.get("stock").map(stock_count).unwrap_or(0),
    })
}

/// Distinct, trimmed category names, sorted.
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter_map(|p| p.categoria.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub(crate) fn stock_count(value: &Value) -> u64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n.floor() as u64
    } else {
        0
    }
}

pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn first_text(obj: &serde_json::Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|f| text(obj.get(*f)))
}

/// `"S, M,L"` or `["S", "M", "L"]` into a clean list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        _ => Vec::new(),
    }
}
