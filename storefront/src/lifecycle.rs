// storefront/src/lifecycle.rs

//! Product and order status rules.
//!
//! Everything here is pure: functions take the state that was read and return
//! the state to write, or the error to answer with. Writes happen in the
//! handlers and flows, guarded on the state these functions were given.

use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, OrderVerdict, Product, ProductState, ProductStatus};

/// Buyer-side reservation toggle. Reserving an active product hands it to
/// `token`; the same token on a product it holds releases it.
pub fn toggle_reservation(current: &ProductState, token: &str) -> Result<ProductState> {
  match current.status {
    ProductStatus::Sold => Err(AppError::Validation("Cannot reserve a sold product".to_string())),
    ProductStatus::Active => Ok(ProductState::reserved_by(Some(token.to_string()))),
    ProductStatus::Reserved if current.reserved_by.as_deref() == Some(token) => Ok(ProductState::active()),
    ProductStatus::Reserved => Err(AppError::Forbidden(
      "You can only cancel your own reservations".to_string(),
    )),
  }
}

/// Admin status change. Admin holds carry no token.
pub fn admin_override(current: &ProductState, target: ProductStatus) -> Result<ProductState> {
  if current.status == ProductStatus::Sold && target != ProductStatus::Sold {
    return Err(AppError::Validation("A sold product cannot change status".to_string()));
  }
  Ok(match target {
    ProductStatus::Active => ProductState::active(),
    ProductStatus::Reserved => ProductState::reserved_by(None),
    ProductStatus::Sold => ProductState::sold(),
  })
}

fn index_by_id(products: &[Product]) -> HashMap<Uuid, &Product> {
  products.iter().map(|p| (p.id, p)).collect()
}

/// Every id must resolve to an active product.
pub fn ensure_orderable(products: &[Product], ids: &[Uuid]) -> Result<()> {
  let by_id = index_by_id(products);
  for id in ids {
    match by_id.get(id) {
      None => return Err(AppError::NotFound("Product not found".to_string())),
      Some(p) if p.status != ProductStatus::Active => {
        return Err(AppError::Validation("Product is not available".to_string()));
      }
      Some(_) => {}
    }
  }
  Ok(())
}

/// Every id must resolve and none may be sold. Reserved products are allowed
/// through; the bulk write only touches the active ones.
pub fn ensure_bulk_reservable(products: &[Product], ids: &[Uuid]) -> Result<()> {
  let by_id = index_by_id(products);
  if ids.iter().any(|id| !by_id.contains_key(id)) {
    return Err(AppError::NotFound("Products not found".to_string()));
  }
  if products.iter().any(|p| p.status == ProductStatus::Sold) {
    return Err(AppError::Validation("Cannot reserve sold products".to_string()));
  }
  Ok(())
}

pub fn ensure_pending(order: &Order) -> Result<()> {
  match order.status {
    OrderStatus::Pending => Ok(()),
    OrderStatus::Verified => Err(AppError::Validation("Order has already been verified".to_string())),
    OrderStatus::Rejected => Err(AppError::Validation("Order has already been rejected".to_string())),
  }
}

/// The product state that follows a verdict on its order, or `None` when the
/// product is left as it is.
///
/// Orders hold their product without a token. Verifying sells such a hold
/// and nothing else; rejecting releases it and leaves any other state alone,
/// including a buyer's own reservation made after the order.
pub fn product_after_verdict(current: &ProductState, verdict: OrderVerdict) -> Result<Option<ProductState>> {
  let held_by_order = current.status == ProductStatus::Reserved && current.reserved_by.is_none();
  match verdict {
    OrderVerdict::Verified if held_by_order => Ok(Some(ProductState::sold())),
    OrderVerdict::Verified if current.status == ProductStatus::Sold => {
      Err(AppError::Validation("Product has already been sold".to_string()))
    }
    OrderVerdict::Verified => Err(AppError::Validation(
      "Product is no longer reserved for this order".to_string(),
    )),
    OrderVerdict::Rejected if held_by_order => Ok(Some(ProductState::active())),
    OrderVerdict::Rejected => Ok(None),
  }
}
