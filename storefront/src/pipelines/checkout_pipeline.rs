// storefront/src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::lifecycle;
use crate::models::NewOrder;
use crate::pipelines::contexts::CheckoutCtxData;
use garage_flow::{ContextData, Flows, Pipeline, PipelineControl};
use tracing::{error, info, warn};

pub fn register_checkout_pipeline(flows: &Flows<AppError>) {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("load_and_validate_products", false),
    ("insert_pending_orders", false),
    ("reserve_ordered_products", false),
  ]);

  // Step 1: Every requested product exists and is still active.
  p.on_step("load_and_validate_products", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, product_ids) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.product_ids.clone())
      };

      let products = store.get_products(&product_ids).await?;
      lifecycle::ensure_orderable(&products, &product_ids)?;
      info!(count = product_ids.len(), "Checkout: all products available.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 2: One pending order per product.
  p.on_step("insert_pending_orders", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, new_orders) = {
        let guard = ctx_data.read();
        let new_orders: Vec<NewOrder> = guard
          .product_ids
          .iter()
          .map(|product_id| NewOrder {
            product_id: *product_id,
            buyer: guard.buyer.clone(),
          })
          .collect();
        (guard.app_state.store.clone(), new_orders)
      };

      let created = store.insert_orders(new_orders).await?;
      info!(count = created.len(), "Checkout: pending orders inserted.");
      ctx_data.write().created_orders = created;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.compensate_step("insert_pending_orders", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, order_ids) = {
        let guard = ctx_data.read();
        let ids: Vec<_> = guard.created_orders.iter().map(|o| o.id).collect();
        (guard.app_state.store.clone(), ids)
      };
      if order_ids.is_empty() {
        return Ok::<_, AppError>(());
      }

      let removed = store.delete_orders(&order_ids).await?;
      if removed != order_ids.len() as u64 {
        error!(expected = order_ids.len(), removed, "Checkout: not every pending order could be removed.");
      } else {
        warn!(removed, "Checkout: pending orders removed after failed reservation.");
      }
      ctx_data.write().created_orders.clear();
      Ok(())
    })
  });

  // Step 3: Reserve the whole set, or nothing if any was taken meanwhile.
  p.on_step("reserve_ordered_products", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, product_ids) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.product_ids.clone())
      };

      if !store.reserve_all_active(&product_ids).await? {
        warn!("Checkout: a product was taken between validation and reservation.");
        return Err(AppError::Validation("Product is not available".to_string()));
      }
      info!(count = product_ids.len(), "Checkout: products reserved.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  flows.register_pipeline(p);
  info!("Checkout pipeline registered.");
}
