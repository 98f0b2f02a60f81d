// storefront/src/web/handlers/dashboard_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminSession;

pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Payment instructions and feature switches for the storefront pages.
pub async fn store_info_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let config = &app_state.config;
  HttpResponse::Ok().json(json!({
    "sinpe_phone": config.sinpe_phone,
    "sinpe_name": config.sinpe_name,
    "reserve_enabled": config.enable_reserve,
  }))
}

#[instrument(name = "handler::dashboard", skip_all, fields(admin = %admin.user.id))]
pub async fn dashboard_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
) -> Result<HttpResponse, AppError> {
  let stats = app_state.store.dashboard_stats().await?;
  Ok(HttpResponse::Ok().json(json!({ "data": stats })))
}
