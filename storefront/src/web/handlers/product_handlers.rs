// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::lifecycle;
use crate::models::{ProductFilter, ProductInput, ProductStatus};
use crate::state::AppState;
use crate::web::extractors::AdminSession;

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ProductFilter>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.store.list_products(&query).await?;
  info!(count = products.len(), "Products listed.");
  Ok(HttpResponse::Ok().json(json!({ "data": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = app_state
    .store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "data": product })))
}

#[instrument(name = "handler::create_product", skip_all, fields(admin = %admin.user.id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  payload: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let new_product = payload.into_inner().validate()?;
  let product = app_state.store.create_product(new_product).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(json!({ "data": product })))
}

#[instrument(name = "handler::update_product", skip_all, fields(admin = %admin.user.id, product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  path: web::Path<Uuid>,
  payload: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let current = app_state
    .store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  let details = payload.into_inner().merge_onto(&current)?;
  let product = app_state
    .store
    .update_product(product_id, details)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  info!("Product details updated.");
  Ok(HttpResponse::Ok().json(json!({ "data": product })))
}

#[instrument(name = "handler::delete_product", skip_all, fields(admin = %admin.user.id, product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  if !app_state.store.delete_product(path.into_inner()).await? {
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  info!("Product deleted.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct StatusOverridePayload {
  pub status: Option<String>,
}

#[instrument(name = "handler::set_product_status", skip_all, fields(admin = %admin.user.id, product_id = %path.as_ref()))]
pub async fn set_product_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  path: web::Path<Uuid>,
  payload: web::Json<StatusOverridePayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let target: ProductStatus = payload
    .status
    .as_deref()
    .unwrap_or_default()
    .parse()?;

  let product = app_state
    .store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
  let current = product.state();
  let next = lifecycle::admin_override(&current, target)?;

  if current != next && !app_state.store.transition_product(product_id, &current, &next).await? {
    warn!("Product changed while its status was being overridden.");
    return Err(AppError::Validation(
      "Product changed concurrently; reload and try again".to_string(),
    ));
  }
  info!(status = %target, "Product status overridden by admin.");
  Ok(HttpResponse::Ok().json(json!({ "success": true, "status": target })))
}
