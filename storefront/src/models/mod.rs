// storefront/src/models/mod.rs

//! Data structures representing database entities and the inputs that create them.

pub mod category;
pub mod order;
pub mod product;

pub use category::{Category, CategoryInput, CategoryRef, NewCategory};
pub use order::{
  BuyerDetails, CheckoutRequest, NewOrder, Order, OrderListing, OrderStatus, OrderVerdict, ProductSummary, VerdictRequest,
};
pub use product::{NewProduct, Product, ProductFilter, ProductInput, ProductListing, ProductState, ProductStatus};

use serde::Serialize;

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
  pub total_products: i64,
  pub active_products: i64,
  pub total_orders: i64,
  pub pending_orders: i64,
}
