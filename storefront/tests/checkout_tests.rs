// tests/checkout_tests.rs
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use garage_storefront::models::{OrderStatus, ProductState, ProductStatus};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

fn checkout_body(product_ids: &[Uuid]) -> Value {
  json!({
    "products": product_ids,
    "buyer_name": "Ana Mora",
    "buyer_phone": "8888-0000",
    "buyer_email": "ana@example.com",
    "sinpe_reference": "SINPE-98765",
  })
}

#[actix_web::test]
async fn test_checkout_creates_one_pending_order_per_product() {
  let state = build_state();
  let app = init_app!(state);
  let a = seed_product(&state, "Sofá", 70_000).await;
  let b = seed_product(&state, "Alfombra", 15_000).await;

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(checkout_body(&[a.id, b.id]))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  let orders = body["data"].as_array().expect("data array");
  assert_eq!(orders.len(), 2);
  assert!(orders.iter().all(|o| o["status"] == "pending"));
  assert!(orders.iter().all(|o| o["sinpe_reference"] == "SINPE-98765"));

  for id in [a.id, b.id] {
    let stored = state.store.get_product(id).await.unwrap().unwrap();
    assert_eq!(stored.state(), ProductState::reserved_by(None));
  }
  let listed = state.store.list_orders().await.unwrap();
  assert_eq!(listed.len(), 2);
  assert!(listed.iter().all(|o| o.order.status == OrderStatus::Pending));
}

#[actix_web::test]
async fn test_checkout_accepts_single_product_id() {
  let state = build_state();
  let app = init_app!(state);
  let product = seed_product(&state, "Espejo", 9_000).await;

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(json!({
      "product_id": product.id,
      "buyer_name": "Luis",
      "buyer_phone": "7000-0000",
      "buyer_email": "luis@example.com",
      "sinpe_reference": "123",
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["data"][0]["product_id"], json!(product.id));
}

#[actix_web::test]
async fn test_unavailable_products_are_rejected_without_orders() {
  let state = build_state();
  let app = init_app!(state);
  let active = seed_product(&state, "Libro", 2_000).await;
  let held = seed_product(&state, "Cuadro", 12_000).await;
  let sold = seed_product(&state, "Reloj", 25_000).await;
  set_state(&state, &held, ProductState::reserved_by(Some("tok".to_string()))).await;
  set_state(&state, &sold, ProductState::sold()).await;

  for unavailable in [held.id, sold.id] {
    let req = test::TestRequest::post()
      .uri("/api/orders")
      .set_json(checkout_body(&[active.id, unavailable]))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Product is not available");
  }

  assert!(state.store.list_orders().await.unwrap().is_empty());
  let stored = state.store.get_product(active.id).await.unwrap().unwrap();
  assert_eq!(stored.status, ProductStatus::Active);
}

#[actix_web::test]
async fn test_checkout_validates_request() {
  let state = build_state();
  let app = init_app!(state);
  let product = seed_product(&state, "Jarrón", 4_000).await;

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(json!({ "products": [product.id], "buyer_name": "Ana" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "All fields are required");

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(checkout_body(&[Uuid::new_v4()]))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  // Malformed JSON still gets a JSON error body.
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .insert_header(("Content-Type", "application/json"))
    .set_payload("{ not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn test_failed_reservation_removes_inserted_orders() {
  let store = Arc::new(FlakyStore::new());
  let state = build_state_with(store.clone(), test_config(&[]));
  let app = init_app!(state);
  let a = seed_product(&state, "Cama", 90_000).await;
  let b = seed_product(&state, "Ropero", 55_000).await;
  let c = seed_product(&state, "Mesa de noche", 20_000).await;
  store.fail_reserve_all(true);

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(checkout_body(&[a.id, b.id, c.id]))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "An internal error occurred");

  assert!(state.store.list_orders().await.unwrap().is_empty());
  for id in [a.id, b.id, c.id] {
    let stored = state.store.get_product(id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProductStatus::Active);
  }

  // Once the store recovers the same cart goes through.
  store.fail_reserve_all(false);
  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(checkout_body(&[a.id, b.id, c.id]))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
  assert_eq!(state.store.list_orders().await.unwrap().len(), 3);
}

#[actix_web::test]
async fn test_losing_the_reservation_race_removes_inserted_orders() {
  let store = Arc::new(FlakyStore::new());
  let state = build_state_with(store.clone(), test_config(&[]));
  let app = init_app!(state);
  let a = seed_product(&state, "Escritorio", 40_000).await;
  let b = seed_product(&state, "Silla de oficina", 25_000).await;
  store.lose_reserve_race(true);

  let req = test::TestRequest::post()
    .uri("/api/orders")
    .set_json(checkout_body(&[a.id, b.id]))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Product is not available");

  assert!(state.store.list_orders().await.unwrap().is_empty());
  for id in [a.id, b.id] {
    let stored = state.store.get_product(id).await.unwrap().unwrap();
    assert_eq!(stored.state(), ProductState::active());
  }
}
