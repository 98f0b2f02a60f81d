// storefront/src/web/handlers/upload_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::upload_service::{build_object_key, random_suffix};
use crate::state::AppState;
use crate::web::extractors::AdminSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
  pub filename: Option<String>,
  pub content_type: Option<String>,
}

#[instrument(name = "handler::presign_upload", skip_all, fields(admin = %admin.user.id))]
pub async fn presign_upload_handler(
  app_state: web::Data<AppState>,
  admin: AdminSession,
  payload: web::Json<UploadRequest>,
) -> Result<HttpResponse, AppError> {
  let UploadRequest {
    filename,
    content_type,
  } = payload.into_inner();
  let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
  let (Some(filename), Some(content_type)) = (present(filename), present(content_type)) else {
    return Err(AppError::Validation("Filename and content type are required".to_string()));
  };

  let key = build_object_key(&filename, Utc::now().timestamp_millis(), &random_suffix());
  let upload = app_state.uploads.presign_put(&key, &content_type).await?;
  info!(%key, "Upload URL issued.");
  Ok(HttpResponse::Ok().json(upload))
}
