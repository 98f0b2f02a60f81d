// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CheckoutRequest, VerdictRequest};
use crate::pipelines::contexts::{CheckoutCtxData, VerifyOrderCtxData};
use crate::state::AppState;
use crate::web::extractors::AdminSession;
use garage_flow::{ContextData, PipelineResult};

#[instrument(name = "handler::list_orders", skip_all, fields(admin = %admin.user.id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.store.list_orders().await?;
  Ok(HttpResponse::Ok().json(json!({ "data": orders })))
}

/// Public checkout: one pending order per product, then the products are reserved.
#[instrument(name = "handler::checkout", skip_all)]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let (product_ids, buyer) = payload.into_inner().validate()?;
  info!(products = product_ids.len(), "Checkout attempt.");

  let ctx_data = ContextData::new(CheckoutCtxData::new(app_state.get_ref().clone(), product_ids, buyer));

  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let orders = ctx_data.read().created_orders.clone();
      info!(orders = orders.len(), "Checkout completed.");
      Ok(HttpResponse::Created().json(json!({ "data": orders })))
    }
    PipelineResult::Stopped => {
      warn!("Checkout pipeline stopped before completing.");
      Err(AppError::Internal("Checkout did not complete".to_string()))
    }
  }
}

#[instrument(name = "handler::verify_order", skip_all, fields(admin = %admin.user.id, order_id = %path.as_ref()))]
pub async fn verify_order_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  path: web::Path<Uuid>,
  payload: web::Json<VerdictRequest>,
) -> Result<HttpResponse, AppError> {
  let verdict = payload.verdict()?;
  let order_id = path.into_inner();

  let ctx_data = ContextData::new(VerifyOrderCtxData::new(app_state.get_ref().clone(), order_id, verdict));

  match app_state.flows.run(ctx_data).await? {
    PipelineResult::Completed => {
      info!(?verdict, "Order decided.");
      Ok(HttpResponse::Ok().json(json!({ "success": true })))
    }
    PipelineResult::Stopped => {
      warn!("Verification pipeline stopped before completing.");
      Err(AppError::Internal("Order verification did not complete".to_string()))
    }
  }
}
