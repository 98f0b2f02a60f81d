// storefront/src/pipelines/verification_pipeline.rs

use crate::errors::AppError;
use crate::lifecycle;
use crate::models::OrderStatus;
use crate::pipelines::contexts::VerifyOrderCtxData;
use garage_flow::{ContextData, Flows, Pipeline, PipelineControl};
use tracing::{info, warn};

pub fn register_verification_pipeline(flows: &Flows<AppError>) {
  let mut p = Pipeline::<VerifyOrderCtxData, AppError>::new(&[
    ("load_order", false),
    ("update_order_status", false),
    ("update_product_status", false),
  ]);

  p.on_step("load_order", |ctx_data: ContextData<VerifyOrderCtxData>| {
    Box::pin(async move {
      let (store, order_id, verdict) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.order_id, guard.verdict)
      };

      let order = store
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
      lifecycle::ensure_pending(&order)?;

      // Refuse before the order is touched when the product cannot follow.
      if let Some(product_id) = order.product_id {
        if let Some(product) = store.get_product(product_id).await? {
          lifecycle::product_after_verdict(&product.state(), verdict)?;
        }
      }
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Guarded on "pending", so two admins cannot both decide the same order.
  p.on_step("update_order_status", |ctx_data: ContextData<VerifyOrderCtxData>| {
    Box::pin(async move {
      let (store, order_id, verdict) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.order_id, guard.verdict)
      };

      let next = verdict.order_status();
      if !store.transition_order(order_id, OrderStatus::Pending, next).await? {
        warn!(%order_id, "Order was decided by another request.");
        return Err(AppError::Validation(
          "Order is no longer pending; reload and try again".to_string(),
        ));
      }
      info!(%order_id, status = ?next, "Order status updated.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.compensate_step("update_order_status", |ctx_data: ContextData<VerifyOrderCtxData>| {
    Box::pin(async move {
      let (store, order_id, verdict) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.order_id, guard.verdict)
      };
      if store.transition_order(order_id, verdict.order_status(), OrderStatus::Pending).await? {
        warn!(%order_id, "Order returned to pending after failed product update.");
      }
      Ok::<_, AppError>(())
    })
  });

  p.on_step("update_product_status", |ctx_data: ContextData<VerifyOrderCtxData>| {
    Box::pin(async move {
      let (store, product_id, verdict) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.order.as_ref().and_then(|o| o.product_id),
          guard.verdict,
        )
      };

      let Some(product_id) = product_id else {
        warn!("Order has no product; nothing to update.");
        return Ok::<_, AppError>(PipelineControl::Continue);
      };
      let Some(product) = store.get_product(product_id).await? else {
        warn!(%product_id, "Ordered product no longer exists; nothing to update.");
        return Ok(PipelineControl::Continue);
      };

      let current = product.state();
      let Some(next) = lifecycle::product_after_verdict(&current, verdict)? else {
        info!(%product_id, status = %current.status, "Product not held; left unchanged.");
        return Ok(PipelineControl::Continue);
      };

      if !store.transition_product(product_id, &current, &next).await? {
        warn!(%product_id, "Product changed while the order was being decided.");
        return Err(AppError::Validation(
          "Product changed concurrently; reload and try again".to_string(),
        ));
      }
      info!(%product_id, status = %next.status, "Product status updated.");
      ctx_data.write().product_state = Some(next);
      Ok(PipelineControl::Continue)
    })
  });

  flows.register_pipeline(p);
  info!("Order verification pipeline registered.");
}
