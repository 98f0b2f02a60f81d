// storefront/src/pipelines/contexts.rs

//! Per-run data for the storefront flows. Handlers receive these wrapped in
//! `garage_flow::ContextData`.

use crate::models::{BuyerDetails, Order, OrderVerdict, ProductState};
use crate::state::AppState;
use uuid::Uuid;

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub product_ids: Vec<Uuid>,
  pub buyer: BuyerDetails,
  /// Filled by `insert_pending_orders`, emptied again if they are rolled back.
  pub created_orders: Vec<Order>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, product_ids: Vec<Uuid>, buyer: BuyerDetails) -> Self {
    Self {
      app_state,
      product_ids,
      buyer,
      created_orders: Vec::new(),
    }
  }
}

#[derive(Clone)]
pub struct VerifyOrderCtxData {
  pub app_state: AppState,
  pub order_id: Uuid,
  pub verdict: OrderVerdict,
  pub order: Option<Order>,
  /// The product state written by `update_product_status`, if any.
  pub product_state: Option<ProductState>,
}

impl VerifyOrderCtxData {
  pub fn new(app_state: AppState, order_id: Uuid, verdict: OrderVerdict) -> Self {
    Self {
      app_state,
      order_id,
      verdict,
      order: None,
      product_state: None,
    }
  }
}
