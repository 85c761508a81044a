//! Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use mix_backend_mock::MockBackend;
use mix_client::{Backend, ClientError, ClientResult, PostalLookup};
use mix_storefront::checkout::Checkout;
use mix_storefront::shipping::ShippingCalculator;
use serde_json::{Value, json};
use shared::models::PostalAddress;
use std::sync::Arc;

/// Postal lookup that knows exactly one code
pub struct StubPostal;

#[async_trait]
impl PostalLookup for StubPostal {
    async fn lookup(&self, code: &str) -> ClientResult<PostalAddress> {
        if code == "80000000" {
            Ok(PostalAddress {
                logradouro: "Rua XV de Novembro".into(),
                bairro: "Centro".into(),
                cidade: "Curitiba".into(),
                estado: "PR".into(),
            })
        } else {
            Err(ClientError::NotFound(format!("postal code {}", code)))
        }
    }
}

pub fn product_row(id: &str, per_box: i64, stock: i64, vista: f64, cartao: f64) -> Value {
    json!({
        "id": id,
        "codigo": format!("MX-{}", id),
        "name": format!("Produto {}", id),
        "price_vista": vista,
        "price_cartao": cartao,
        "quantity_per_box": per_box,
        "stock": stock,
        "image_urls": [],
        "colors": [],
    })
}

pub fn checkout_for(backend: &Arc<MockBackend>) -> Checkout {
    let shipping = ShippingCalculator::with_seed(Arc::new(StubPostal), 7);
    Checkout::new(backend.clone() as Arc<dyn Backend>, shipping)
}

/// Drive a checkout to the ready-to-place state
pub async fn ready_checkout(backend: &Arc<MockBackend>, products: &[Value]) -> Checkout {
    backend.seed_table("produtos", products.to_vec());
    let mut checkout = checkout_for(backend);
    for row in products {
        let product = serde_json::from_value(row.clone()).unwrap();
        checkout.cart.add_box(&product).unwrap();
    }
    checkout.lookup_postal("80000-000").await.unwrap();
    checkout.set_street_number("123", "sala 2").unwrap();
    checkout.select_shipping(0).unwrap();
    checkout
}
