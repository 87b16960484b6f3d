use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use stuffies_cache::{Cache, Session, SessionProfile};
use stuffies_commerce::checkout::{place_order, CustomerForm};
use stuffies_commerce::prelude::*;

fn product(id: &str, precio: i64) -> ProductSnapshot {
    ProductSnapshot::new(id, format!("Producto {id}"), Money::new(precio))
}

fn sum_of_lines(store: &CartStore) -> (u64, Money) {
    store.get_cart().iter().fold((0, Money::ZERO), |(n, total), item| {
        (n + u64::from(item.cantidad), total + item.line_total())
    })
}

#[test]
fn repeated_adds_merge_into_one_line() {
    let store = CartStore::new(Cache::in_memory());
    for cantidad in [1, 4, 2, 3] {
        store.add_to_cart(
            product("1", 1000),
            AddOptions::new().talla("M").color("Negro").cantidad(cantidad),
        );
    }

    let cart = store.get_cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].cantidad, 10);
}

#[test]
fn cart_stored_by_older_client_merges_with_new_adds() {
    let cache = Cache::in_memory();
    cache
        .set(
            "stuffies:cart",
            &json!([
                {"productId": 1, "nombre": "Gorro", "precio": 5990, "imagen": null,
                 "talla": "Única", "color": "Único", "cantidad": 1},
                {"productId": 2, "nombre": "Polera", "precio": -100, "imagen": null,
                 "talla": "M", "color": "Único", "cantidad": 1}
            ]),
        )
        .unwrap();
    let store = CartStore::new(cache);

    store.add_to_cart(ProductSnapshot::new("1", "Gorro", Money::new(5990)), AddOptions::new());
    store.add_to_cart(product("2", 9990), AddOptions::new().talla("M"));

    let cart = store.get_cart();
    assert_eq!(cart.len(), 2);
    assert_eq!((cart[0].talla.as_deref(), cart[0].color.as_deref()), (None, None));
    assert_eq!(cart[0].cantidad, 2);
    assert_eq!((cart[1].talla.as_deref(), cart[1].color.as_deref()), (Some("M"), None));
    assert_eq!(cart[1].cantidad, 2);
    assert_eq!(cart[1].precio, Money::ZERO);
    assert_eq!(store.get_cart_totals().subtotal, Money::new(11980));
}

#[test]
fn same_size_twice_sums_quantities() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M").cantidad(2));
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M").cantidad(3));

    assert_eq!(store.get_cart().len(), 1);
    assert_eq!(store.get_cart()[0].cantidad, 5);
    assert_eq!(store.get_cart_totals().subtotal, Money::new(5000));
}

#[test]
fn different_sizes_are_separate_lines() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M"));
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("L"));

    assert_eq!(store.get_cart().len(), 2);
    assert_eq!(
        store.get_cart_totals(),
        CartTotals {
            cantidad: 2,
            subtotal: Money::new(2000)
        }
    );
}

#[test]
fn different_colors_are_separate_lines() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M").color("Rojo"));
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M").color("Azul"));
    assert_eq!(store.get_cart().len(), 2);
}

#[test]
fn totals_match_lines_after_mixed_operations() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 12990), AddOptions::new().talla("S").cantidad(2));
    store.add_to_cart(product("2", 4990), AddOptions::new().cantidad(3));
    store.add_to_cart(product("3", 990), AddOptions::new().color("Verde"));
    store.update_quantity(&LineIdentity::new("2", VariantSelection::none()), 1);
    store.remove_from_cart(&LineIdentity::new(
        "3",
        VariantSelection::none().with_color("Verde"),
    ));

    let totals = store.get_cart_totals();
    let (cantidad, subtotal) = sum_of_lines(&store);
    assert_eq!(totals.cantidad, cantidad);
    assert_eq!(totals.subtotal, subtotal);
    assert_eq!(totals.subtotal, Money::new(30970));
}

#[test]
fn update_quantity_never_drops_below_one() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M").cantidad(4));
    let line = LineIdentity::new("1", VariantSelection::none().with_talla("M"));

    store.update_quantity(&line, 0);
    assert_eq!(store.get_cart()[0].cantidad, 1);
    store.update_quantity(&line, -5);
    assert_eq!(store.get_cart()[0].cantidad, 1);
}

#[test]
fn removing_a_missing_line_changes_nothing() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M"));
    let before = store.get_cart();

    store.remove_from_cart(&LineIdentity::new("1", VariantSelection::none()));
    store.remove_from_cart(&LineIdentity::new("99", VariantSelection::none().with_talla("M")));
    assert_eq!(store.get_cart(), before);
}

#[test]
fn clear_empties_cart_and_totals() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().cantidad(3));
    store.clear_cart();

    assert!(store.get_cart().is_empty());
    assert_eq!(
        store.get_cart_totals(),
        CartTotals {
            cantidad: 0,
            subtotal: Money::ZERO
        }
    );
}

#[test]
fn fresh_storage_reads_empty() {
    let store = CartStore::new(Cache::in_memory());
    assert_eq!(store.get_cart(), Vec::<CartLineItem>::new());
}

#[test]
fn catalog_product_goes_into_cart_normalized() {
    let product = normalize_product(&json!({
        "id": 5,
        "nombre": "Polerón Stuffies",
        "precio": "24990",
        "imagen1": "/img/poleron.png",
        "tallas": "S,M,L"
    }))
    .unwrap();

    let store = CartStore::new(Cache::in_memory());
    let line = store.add_to_cart(product.snapshot(), AddOptions::new().talla("M"));
    assert_eq!(line.product_id.as_str(), "5");
    assert_eq!(line.imagen.as_deref(), Some("/img/poleron.png"));
    assert_eq!(store.get_cart_totals().subtotal, Money::new(24990));
}

#[derive(Default)]
struct FakeOrders {
    fail: bool,
    received: Mutex<Vec<OrderPayload>>,
}

#[async_trait]
impl OrderSink for FakeOrders {
    async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, CommerceError> {
        if self.fail {
            return Err(CommerceError::Upstream("connection refused".into()));
        }
        self.received.lock().unwrap().push(payload.clone());
        Ok(OrderReceipt::from_response(json!({"id": 77})))
    }
}

fn form() -> CustomerForm {
    CustomerForm::new("Ana Pérez", "Los Leones 123", "Providencia", "+56912345678")
}

#[tokio::test]
async fn successful_checkout_clears_cart() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new().talla("M").cantidad(2));
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let orders = FakeOrders::default();
    let receipt = place_order(&store, &orders, &form(), &AccountContact::default())
        .await
        .unwrap();

    assert_eq!(receipt.order_id, Some(OrderId::new("77")));
    assert!(store.get_cart().is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let sent = orders.received.lock().unwrap();
    assert_eq!(sent[0].total, Money::new(2000));
    assert_eq!(sent[0].items[0].talla.as_deref(), Some("M"));
}

#[tokio::test]
async fn failed_submission_keeps_cart() {
    let store = CartStore::new(Cache::in_memory());
    store.add_to_cart(product("1", 1000), AddOptions::new());
    let before = store.get_cart();

    let orders = FakeOrders {
        fail: true,
        ..Default::default()
    };
    let err = place_order(&store, &orders, &form(), &AccountContact::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Submission(_)));
    assert_eq!(err.to_string(), "No se pudo registrar la compra. Intenta nuevamente.");
    assert_eq!(store.get_cart(), before);
}

#[tokio::test]
async fn checkout_rejects_empty_cart_and_bad_form() {
    let store = CartStore::new(Cache::in_memory());
    let orders = FakeOrders::default();

    let err = place_order(&store, &orders, &form(), &AccountContact::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));

    store.add_to_cart(product("1", 1000), AddOptions::new());
    let bad = CustomerForm {
        telefono: "123".into(),
        ..form()
    };
    let err = place_order(&store, &orders, &bad, &AccountContact::default())
        .await
        .unwrap_err();
    match err {
        CheckoutError::Invalid(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors.get(CustomerField::Telefono).is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(orders.received.lock().unwrap().is_empty());
    assert_eq!(store.get_cart().len(), 1);
}

#[tokio::test]
async fn checkout_uses_signed_in_account() {
    let cache = Cache::in_memory();
    let session = Session::new(cache.clone());
    session
        .save(&SessionProfile {
            token: Some("jwt".into()),
            username: Some("ana.p".into()),
            email: Some("ana@example.cl".into()),
            ..Default::default()
        })
        .unwrap();

    let store = CartStore::new(cache);
    store.add_to_cart(product("1", 1000), AddOptions::new());
    let orders = FakeOrders::default();
    place_order(&store, &orders, &form(), &account_contact(&session))
        .await
        .unwrap();

    let sent = orders.received.lock().unwrap();
    assert_eq!(sent[0].cliente.nombre, "ana.p");
    assert_eq!(sent[0].cliente.email, "ana@example.cl");
    assert_eq!(sent[0].cliente.direccion, "Los Leones 123, Providencia");
}
