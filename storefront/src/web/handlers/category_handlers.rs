// storefront/src/web/handlers/category_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CategoryInput;
use crate::state::AppState;
use crate::web::extractors::AdminSession;

#[instrument(name = "handler::list_categories", skip_all)]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = app_state.store.list_categories().await?;
  Ok(HttpResponse::Ok().json(json!({ "data": categories })))
}

#[instrument(name = "handler::get_category", skip(app_state, path), fields(category_id = %path.as_ref()))]
pub async fn get_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let category = app_state
    .store
    .get_category(path.into_inner())
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "data": category })))
}

#[instrument(name = "handler::create_category", skip_all, fields(admin = %admin.user.id))]
pub async fn create_category_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
  let new_category = payload.into_inner().validate()?;
  let category = app_state.store.create_category(new_category).await?;
  info!(category_id = %category.id, slug = %category.slug, "Category created.");
  Ok(HttpResponse::Created().json(json!({ "data": category })))
}

#[instrument(name = "handler::update_category", skip_all, fields(admin = %admin.user.id, category_id = %path.as_ref()))]
pub async fn update_category_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  path: web::Path<Uuid>,
  payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
  let changes = payload.into_inner().validate()?;
  let category = app_state
    .store
    .update_category(path.into_inner(), changes)
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
  info!(slug = %category.slug, "Category updated.");
  Ok(HttpResponse::Ok().json(json!({ "data": category })))
}

#[instrument(name = "handler::delete_category", skip_all, fields(admin = %admin.user.id, category_id = %path.as_ref()))]
pub async fn delete_category_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  if !app_state.store.delete_category(path.into_inner()).await? {
    return Err(AppError::NotFound("Category not found".to_string()));
  }
  info!("Category deleted.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
