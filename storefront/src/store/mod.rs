// storefront/src/store/mod.rs

//! Durable state behind one trait, so handlers and flows never see which
//! backend they run against.
//!
//! Status writes are compare-and-set: they name the state the caller read and
//! report `false` when the row no longer matches, instead of overwriting it.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
  Category, DashboardStats, NewCategory, NewOrder, NewProduct, Order, OrderListing, OrderStatus, Product,
  ProductFilter, ProductListing, ProductState,
};

#[async_trait]
pub trait CatalogStore: Send + Sync {
  // --- Categories ---

  /// Sorted by name.
  async fn list_categories(&self) -> Result<Vec<Category>>;
  async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;
  /// A duplicate slug is a validation error.
  async fn create_category(&self, category: NewCategory) -> Result<Category>;
  async fn update_category(&self, id: Uuid, category: NewCategory) -> Result<Option<Category>>;
  /// Products in the category keep existing with no category.
  async fn delete_category(&self, id: Uuid) -> Result<bool>;

  // --- Products ---

  /// Newest first, each with its category's name and slug.
  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductListing>>;
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
  /// The subset of `ids` that exist, in no particular order.
  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
  /// New products start active. An unknown `category_id` is a validation error.
  async fn create_product(&self, product: NewProduct) -> Result<Product>;
  /// Replaces the editable details. Status and reservation are untouched.
  async fn update_product(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>>;
  /// Orders that referenced the product keep existing with no product.
  async fn delete_product(&self, id: Uuid) -> Result<bool>;

  /// Writes `next` only if the product is still in `expected`.
  async fn transition_product(&self, id: Uuid, expected: &ProductState, next: &ProductState) -> Result<bool>;

  /// Reserves for `token` whichever of `ids` are active. Returns how many were.
  async fn reserve_active_products(&self, ids: &[Uuid], token: &str) -> Result<u64>;

  /// Reserves every product in `ids`, without a token, or none of them.
  /// Returns `false` (and writes nothing) if any of them is no longer active.
  async fn reserve_all_active(&self, ids: &[Uuid]) -> Result<bool>;

  // --- Orders ---

  /// Inserts every order as pending, all or nothing.
  async fn insert_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>>;
  async fn delete_orders(&self, ids: &[Uuid]) -> Result<u64>;
  async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
  /// Newest first, each with a summary of its product.
  async fn list_orders(&self) -> Result<Vec<OrderListing>>;
  /// Moves the order from `from` to `to`; `false` if it was not in `from`.
  async fn transition_order(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool>;

  async fn dashboard_stats(&self) -> Result<DashboardStats>;
}
