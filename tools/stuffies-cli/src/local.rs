//! File-backed catalog and order outbox.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use stuffies_commerce::catalog::{normalize_product_list, CatalogSource, Product, Variant};
use stuffies_commerce::checkout::{
    normalize_order, OrderPayload, OrderReceipt, OrderSink, OrderSummary,
};
use stuffies_commerce::{CommerceError, OrderId, ProductId};

/// Catalog read from a JSON file in the same loose shape the API returns.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Product>, CommerceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CommerceError::Upstream(format!("cannot read catalog {}: {}", self.path.display(), e))
        })?;
        let raw: Value = serde_json::from_str(&content)?;
        Ok(normalize_product_list(&raw))
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CommerceError> {
        self.read()
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        self.read()?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }

    async fn get_variants(&self, id: &ProductId) -> Result<Vec<Variant>, CommerceError> {
        Ok(self.get_product(id).await?.variants)
    }
}

/// Order sink that writes each order to its own JSON file.
///
/// Files carry the payload plus `id` and `fechaCreacion`, so they read back
/// like orders from the API.
#[derive(Debug, Clone)]
pub struct Outbox {
    dir: PathBuf,
}

impl Outbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every order in the outbox, newest first.
    pub fn list(&self) -> Result<Vec<OrderSummary>, CommerceError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir).map_err(io_error)?;

        let mut orders = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_error)?.path();
            if path.extension().map_or(true, |e| e != "json") {
                continue;
            }
            match read_order(&path) {
                Some(order) => orders.push(order),
                None => tracing::warn!(path = %path.display(), "skipping unreadable order file"),
            }
        }
        orders.sort_by(|a, b| b.fecha.cmp(&a.fecha));
        Ok(orders)
    }

    /// One order by id. Ids that could name a file outside the outbox are
    /// never looked up.
    pub fn get(&self, id: &OrderId) -> Option<OrderSummary> {
        if !is_file_safe(id.as_str()) {
            tracing::warn!(order_id = %id, "rejecting order id outside the outbox");
            return None;
        }
        read_order(&self.dir.join(format!("{}.json", id)))
    }
}

/// Generated ids only use URL-safe base64 characters.
fn is_file_safe(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn read_order(path: &Path) -> Option<OrderSummary> {
    let content = std::fs::read_to_string(path).ok()?;
    let raw: Value = serde_json::from_str(&content).ok()?;
    normalize_order(&raw)
}

fn io_error(e: std::io::Error) -> CommerceError {
    CommerceError::Upstream(e.to_string())
}

/// `ord_` followed by 12 random URL-safe characters.
fn generate_order_id() -> OrderId {
    let bytes: [u8; 9] = rand::thread_rng().gen();
    OrderId::new(format!("ord_{}", URL_SAFE_NO_PAD.encode(bytes)))
}

#[async_trait]
impl OrderSink for Outbox {
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, CommerceError> {
        let id = generate_order_id();

        let mut record = serde_json::to_value(payload)?;
        if let Value::Object(fields) = &mut record {
            fields.insert("id".into(), Value::String(id.to_string()));
            fields.insert("fechaCreacion".into(), Value::String(Utc::now().to_rfc3339()));
        }

        std::fs::create_dir_all(&self.dir).map_err(io_error)?;
        let path = self.dir.join(format!("{}.json", id));
        std::fs::write(&path, serde_json::to_vec_pretty(&record)?).map_err(io_error)?;
        tracing::debug!(path = %path.display(), "order written to outbox");

        Ok(OrderReceipt::from_response(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stuffies_commerce::cart::{AddOptions, Cart, ProductSnapshot};
    use stuffies_commerce::checkout::{AccountContact, CustomerForm};
    use stuffies_commerce::Money;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stuffies-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_file_catalog() {
        let dir = scratch("catalog");
        let path = dir.join("catalog.json");
        std::fs::write(
            &path,
            r#"{"content": [
                {"id": 1, "nombre": "Polera", "precio": 9990,
                 "variants": [{"talla": "M", "stock": 3}]},
                {"id": 2, "nombre": "Gorro", "precio": "5990"}
            ]}"#,
        )
        .unwrap();

        let catalog = FileCatalog::new(&path);
        assert_eq!(catalog.list_products().await.unwrap().len(), 2);
        let variants = catalog.get_variants(&ProductId::new("1")).await.unwrap();
        assert_eq!(variants[0].stock, 3);
        assert!(matches!(
            catalog.get_product(&ProductId::new("3")).await,
            Err(CommerceError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_outbox_round_trip() {
        let dir = scratch("outbox");
        let outbox = Outbox::new(dir.join("orders"));
        assert!(outbox.list().unwrap().is_empty());

        let mut cart = Cart::new();
        cart.add_item(
            ProductSnapshot::new("1", "Polera", Money::new(9990)),
            AddOptions::new().talla("M").cantidad(2),
        );
        let form = CustomerForm::new("Ana Pérez", "Los Leones 123", "Providencia", "912345678");
        let payload = OrderPayload::from_cart(&cart, &form, &AccountContact::default());

        let receipt = outbox.create_order(&payload).await.unwrap();
        let id = receipt.order_id.unwrap();
        assert!(id.as_str().starts_with("ord_"));

        let stored = outbox.get(&id).unwrap();
        assert_eq!(stored.total, Money::new(19980));
        assert_eq!(stored.nombre.as_deref(), Some("Ana Pérez"));
        assert_eq!(stored.direccion.as_deref(), Some("Los Leones 123, Providencia"));
        assert_eq!(stored.items[0].talla.as_deref(), Some("M"));
        assert_eq!(outbox.list().unwrap().len(), 1);
    }

    #[test]
    fn test_outbox_ignores_ids_outside_its_dir() {
        let dir = scratch("escape");
        let outbox = Outbox::new(dir.join("orders"));
        std::fs::create_dir_all(outbox.dir()).unwrap();
        std::fs::write(
            dir.join("secret.json"),
            r#"{"id": "secret", "total": 1, "items": []}"#,
        )
        .unwrap();
        std::fs::write(
            outbox.dir().join("ord_ok-1.json"),
            r#"{"id": "ord_ok-1", "total": 1, "items": []}"#,
        )
        .unwrap();

        assert!(outbox.get(&OrderId::new("ord_ok-1")).is_some());
        assert!(outbox.get(&OrderId::new("../secret")).is_none());
        assert!(outbox.get(&OrderId::new("..")).is_none());
        assert!(outbox.get(&OrderId::new("a/b")).is_none());
        assert!(outbox.get(&OrderId::new("a\\b")).is_none());
        assert!(outbox.get(&OrderId::new("")).is_none());
    }
}
