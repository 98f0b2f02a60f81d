// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use garage_storefront::config::AppConfig;
use garage_storefront::errors::{AppError, Result};
use garage_storefront::models::{
  Category, DashboardStats, NewCategory, NewOrder, NewProduct, Order, OrderListing, OrderStatus, Product,
  ProductFilter, ProductListing, ProductState,
};
use garage_storefront::services::{AdminUser, PresignedUpload, StaticSessions, UploadSigner};
use garage_storefront::services::upload_service::public_object_url;
use garage_storefront::state::AppState;
use garage_storefront::store::{CatalogStore, MemoryStore};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

pub const ADMIN_TOKEN: &str = "admin-token";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config(overrides: &[(&'static str, &'static str)]) -> AppConfig {
  let mut vars: HashMap<&str, &str> = HashMap::from([
    ("STORE_BACKEND", "memory"),
    ("SUPABASE_URL", "https://auth.test"),
    ("SUPABASE_ANON_KEY", "anon"),
    ("R2_ENDPOINT", "https://r2.test"),
    ("R2_ACCESS_KEY_ID", "key"),
    ("R2_SECRET_ACCESS_KEY", "secret"),
    ("R2_BUCKET_NAME", "garage"),
    ("R2_PUBLIC_URL", "https://images.test"),
    ("SINPE_PHONE", "8888-1234"),
    ("SINPE_NAME", "Venta de Garaje"),
  ]);
  vars.extend(overrides.iter().copied());
  AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("test config must load")
}

/// Signs nothing; returns predictable URLs.
pub struct FakeSigner {
  pub public_base: String,
}

#[async_trait]
impl UploadSigner for FakeSigner {
  async fn presign_put(&self, key: &str, content_type: &str) -> Result<PresignedUpload> {
    Ok(PresignedUpload {
      upload_url: format!("https://upload.test/{}?content-type={}", key, content_type),
      public_url: public_object_url(&self.public_base, key),
      key: key.to_string(),
    })
  }
}

/// Delegates to a `MemoryStore` but can be told to fail specific writes.
#[derive(Default)]
pub struct FlakyStore {
  pub inner: MemoryStore,
  pub fail_reserve_all: AtomicBool,
  pub lose_reserve_race: AtomicBool,
  pub fail_product_transitions: AtomicBool,
}

impl FlakyStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_reserve_all(&self, fail: bool) {
    self.fail_reserve_all.store(fail, Ordering::SeqCst);
  }

  /// Makes `reserve_all_active` answer as if another request took a product first.
  pub fn lose_reserve_race(&self, lose: bool) {
    self.lose_reserve_race.store(lose, Ordering::SeqCst);
  }

  pub fn fail_product_transitions(&self, fail: bool) {
    self.fail_product_transitions.store(fail, Ordering::SeqCst);
  }
}

#[async_trait]
impl CatalogStore for FlakyStore {
  async fn list_categories(&self) -> Result<Vec<Category>> {
    self.inner.list_categories().await
  }
  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    self.inner.get_category(id).await
  }
  async fn create_category(&self, category: NewCategory) -> Result<Category> {
    self.inner.create_category(category).await
  }
  async fn update_category(&self, id: Uuid, category: NewCategory) -> Result<Option<Category>> {
    self.inner.update_category(id, category).await
  }
  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    self.inner.delete_category(id).await
  }
  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductListing>> {
    self.inner.list_products(filter).await
  }
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.inner.get_product(id).await
  }
  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    self.inner.get_products(ids).await
  }
  async fn create_product(&self, product: NewProduct) -> Result<Product> {
    self.inner.create_product(product).await
  }
  async fn update_product(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>> {
    self.inner.update_product(id, product).await
  }
  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    self.inner.delete_product(id).await
  }
  async fn transition_product(&self, id: Uuid, expected: &ProductState, next: &ProductState) -> Result<bool> {
    if self.fail_product_transitions.load(Ordering::SeqCst) {
      return Err(AppError::Internal("injected product write failure".to_string()));
    }
    self.inner.transition_product(id, expected, next).await
  }
  async fn reserve_active_products(&self, ids: &[Uuid], token: &str) -> Result<u64> {
    self.inner.reserve_active_products(ids, token).await
  }
  async fn reserve_all_active(&self, ids: &[Uuid]) -> Result<bool> {
    if self.fail_reserve_all.load(Ordering::SeqCst) {
      return Err(AppError::Internal("injected reservation failure".to_string()));
    }
    if self.lose_reserve_race.load(Ordering::SeqCst) {
      return Ok(false);
    }
    self.inner.reserve_all_active(ids).await
  }
  async fn insert_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>> {
    self.inner.insert_orders(orders).await
  }
  async fn delete_orders(&self, ids: &[Uuid]) -> Result<u64> {
    self.inner.delete_orders(ids).await
  }
  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    self.inner.get_order(id).await
  }
  async fn list_orders(&self) -> Result<Vec<OrderListing>> {
    self.inner.list_orders().await
  }
  async fn transition_order(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool> {
    self.inner.transition_order(id, from, to).await
  }
  async fn dashboard_stats(&self) -> Result<DashboardStats> {
    self.inner.dashboard_stats().await
  }
}

pub fn build_state_with(store: Arc<dyn CatalogStore>, config: AppConfig) -> AppState {
  setup_tracing();
  let sessions = StaticSessions::new().with_session(
    ADMIN_TOKEN,
    AdminUser {
      id: "admin-1".to_string(),
      email: Some("owner@example.com".to_string()),
    },
  );
  let uploads = FakeSigner {
    public_base: config.object_store.public_url.clone(),
  };
  AppState::new(config, store, Arc::new(sessions), Arc::new(uploads))
}

pub fn build_state() -> AppState {
  build_state_with(Arc::new(MemoryStore::new()), test_config(&[]))
}

pub fn bearer() -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", ADMIN_TOKEN))
}

pub async fn seed_product(state: &AppState, name: &str, price: i64) -> Product {
  state
    .store
    .create_product(NewProduct {
      name: name.to_string(),
      description: None,
      price: Decimal::from(price),
      category_id: None,
      image_urls: vec![],
    })
    .await
    .expect("seed product")
}

pub async fn set_state(state: &AppState, product: &Product, next: ProductState) {
  let current = state.store.get_product(product.id).await.unwrap().unwrap().state();
  assert!(state.store.transition_product(product.id, &current, &next).await.unwrap());
}

/// Builds the real route tree around `$state`.
macro_rules! init_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .configure(garage_storefront::web::configure_app_routes),
    )
    .await
  };
}
