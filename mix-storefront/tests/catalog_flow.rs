//! Catalog management tests

mod common;

use common::product_row;
use mix_backend_mock::MockBackend;
use mix_client::Backend;
use mix_storefront::catalog::{CatalogService, ImageUpload};
use mix_storefront::notify::{Notifier, ToastKind};
use shared::ErrorCode;
use shared::models::{NewProduct, ProductUpdate};
use std::sync::Arc;

fn new_product(codigo: &str) -> NewProduct {
    NewProduct {
        codigo: codigo.into(),
        name: "Guirlanda Natalina".into(),
        subgroup: Some("Natal".into()),
        description: String::new(),
        price_vista: 35.0,
        price_cartao: 39.9,
        quantity_per_box: 6,
        colors: vec!["verde".into()],
        image_urls: vec![],
        stock: 10,
    }
}

fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.into(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

fn service(backend: &Arc<MockBackend>) -> CatalogService {
    CatalogService::new(backend.clone() as Arc<dyn Backend>, Notifier::new())
}

#[tokio::test]
async fn create_uploads_images_then_inserts_row() {
    let backend = Arc::new(MockBackend::new());
    let created = service(&backend)
        .create_product(new_product("MX-100"), vec![image("frente.jpg"), image("verso.jpg")])
        .await
        .unwrap();

    assert_eq!(created.codigo, "MX-100");
    assert_eq!(created.image_urls.len(), 2);
    assert!(created.image_urls[0].starts_with("mock://produtos/"));
    assert_eq!(backend.stored_objects().len(), 2);
    assert_eq!(backend.table_rows("produtos").len(), 1);
}

#[tokio::test]
async fn create_requires_an_image_and_valid_fields() {
    let backend = Arc::new(MockBackend::new());
    let service = service(&backend);

    let err = service
        .create_product(new_product("MX-100"), vec![])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ImageRequired);

    let mut invalid = new_product("");
    invalid.price_vista = -1.0;
    let err = service
        .create_product(invalid, vec![image("a.jpg")])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    // Nothing reached storage or the table
    assert!(backend.stored_objects().is_empty());
    assert!(backend.table_rows("produtos").is_empty());
}

#[tokio::test]
async fn failed_row_insert_removes_uploaded_images() {
    let backend = Arc::new(MockBackend::new());
    backend.fail_next_insert("produtos");

    let err = service(&backend)
        .create_product(new_product("MX-100"), vec![image("frente.jpg")])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BackendError);
    assert!(backend.stored_objects().is_empty());
    assert!(backend.table_rows("produtos").is_empty());
}

#[tokio::test]
async fn delete_survives_storage_failure() {
    let backend = Arc::new(MockBackend::new());
    let notifier = Notifier::new();
    let mut toasts = notifier.subscribe();
    let service = CatalogService::new(backend.clone() as Arc<dyn Backend>, notifier);

    let created = service
        .create_product(new_product("MX-100"), vec![image("frente.jpg")])
        .await
        .unwrap();
    backend.fail_storage_remove(true);

    service.delete_product(&created).await.unwrap();
    // The row is gone even though the image removal failed
    assert!(backend.table_rows("produtos").is_empty());
    let toast = toasts.recv().await.unwrap();
    assert_eq!(toast.kind, ToastKind::Warning);
}

#[tokio::test]
async fn update_patches_listed_fields_only() {
    let backend = Arc::new(MockBackend::new());
    backend.seed_table("produtos", vec![product_row("p1", 10, 5, 10.0, 12.0)]);
    let service = service(&backend);

    let patch = ProductUpdate {
        price_vista: Some(11.5),
        stock: Some(8),
        ..ProductUpdate::default()
    };
    let updated = service.update_product("p1", patch).await.unwrap();
    assert_eq!(updated.price_vista, 11.5);
    assert_eq!(updated.stock, 8);
    assert_eq!(updated.price_cartao, 12.0);

    let err = service
        .update_product("missing", ProductUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);
}

#[tokio::test]
async fn listings_are_ordered_for_their_audience() {
    let backend = Arc::new(MockBackend::new());
    let service = service(&backend);
    service
        .create_product(new_product("MX-2"), vec![image("a.jpg")])
        .await
        .unwrap();
    let mut second = new_product("MX-1");
    second.name = "Anjo Dourado".into();
    service
        .create_product(second, vec![image("b.jpg")])
        .await
        .unwrap();

    let for_seller = service.list_for_seller().await.unwrap();
    assert_eq!(for_seller[0].name, "Anjo Dourado");

    let found = service.search("guirlanda").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].codigo, "MX-2");
}
