// storefront/src/web/handlers/reservation_handlers.rs

//! Buyer reservations. Buyers have no account; a reservation belongs to the
//! opaque token their browser generated and kept.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle;
use crate::state::AppState;

fn ensure_reservations_enabled(app_state: &AppState) -> Result<(), AppError> {
  if !app_state.config.enable_reserve {
    return Err(AppError::Forbidden("Reservations are disabled".to_string()));
  }
  Ok(())
}

/// Tokens are opaque and compared byte for byte; only an empty one is refused.
fn required_token(token: Option<String>) -> Result<String, AppError> {
  token
    .filter(|t| !t.is_empty())
    .ok_or_else(|| AppError::Validation("Reservation token is required".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ReservePayload {
  pub reservation_token: Option<String>,
}

#[instrument(name = "handler::toggle_reservation", skip(app_state, path, payload), fields(product_id = %path.as_ref()))]
pub async fn toggle_reservation_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ReservePayload>,
) -> Result<HttpResponse, AppError> {
  ensure_reservations_enabled(&app_state)?;
  let product_id = path.into_inner();
  let token = required_token(payload.into_inner().reservation_token)?;

  let product = app_state
    .store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  let current = product.state();
  let next = lifecycle::toggle_reservation(&current, &token)?;

  if !app_state.store.transition_product(product_id, &current, &next).await? {
    warn!("Product changed between read and reservation write.");
    return Err(AppError::Validation(
      "Product changed concurrently; reload and try again".to_string(),
    ));
  }
  info!(status = %next.status, "Reservation toggled.");
  Ok(HttpResponse::Ok().json(json!({ "status": next.status })))
}

#[derive(Debug, Deserialize)]
pub struct BulkReservePayload {
  #[serde(default)]
  pub product_ids: Vec<Uuid>,
  pub reservation_token: Option<String>,
}

#[instrument(name = "handler::bulk_reserve", skip_all)]
pub async fn bulk_reserve_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<BulkReservePayload>,
) -> Result<HttpResponse, AppError> {
  ensure_reservations_enabled(&app_state)?;
  let BulkReservePayload {
    mut product_ids,
    reservation_token,
  } = payload.into_inner();
  if product_ids.is_empty() {
    return Err(AppError::Validation("At least one product ID is required".to_string()));
  }
  let token = required_token(reservation_token)?;
  product_ids.sort_unstable();
  product_ids.dedup();

  let products = app_state.store.get_products(&product_ids).await?;
  lifecycle::ensure_bulk_reservable(&products, &product_ids)?;

  let reserved = app_state.store.reserve_active_products(&product_ids, &token).await?;
  info!(requested = product_ids.len(), reserved, "Bulk reservation applied.");
  Ok(HttpResponse::Ok().json(json!({ "success": true, "reserved": reserved })))
}
