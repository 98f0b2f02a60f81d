// storefront/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::services::AdminUser;
use crate::state::AppState;

/// A request made by a signed-in admin. Taking this as a handler argument is
/// what makes a route admin-only.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub user: AdminUser,
}

/// Session cookie first, then `Authorization: Bearer`.
fn access_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
  if let Some(cookie) = req.cookie(cookie_name) {
    let value = cookie.value().trim();
    if !value.is_empty() {
      return Some(value.to_string());
    }
  }
  req
    .headers()
    .get(AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|h| h.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_string)
}

impl FromRequest for AdminSession {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(app_state) = req.app_data::<web::Data<AppState>>().cloned() else {
      return Box::pin(async { Err(AppError::Internal("Application state is not configured".to_string())) });
    };
    let token = access_token(req, &app_state.config.session_cookie_name);

    Box::pin(async move {
      let Some(token) = token else {
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
      };
      match app_state.sessions.verify(&token).await? {
        Some(user) => Ok(AdminSession { user }),
        None => {
          warn!("Rejected admin request with an unknown session token.");
          Err(AppError::Unauthorized("Unauthorized".to_string()))
        }
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::cookie::Cookie;
  use actix_web::test::TestRequest;

  #[test]
  fn cookie_wins_over_bearer_header() {
    let req = TestRequest::default()
      .cookie(Cookie::new("sb-access-token", "from-cookie"))
      .insert_header((AUTHORIZATION, "Bearer from-header"))
      .to_http_request();
    assert_eq!(access_token(&req, "sb-access-token").as_deref(), Some("from-cookie"));
  }

  #[test]
  fn bearer_header_is_used_without_cookie() {
    let req = TestRequest::default()
      .insert_header((AUTHORIZATION, "Bearer abc123"))
      .to_http_request();
    assert_eq!(access_token(&req, "sb-access-token").as_deref(), Some("abc123"));

    let basic = TestRequest::default()
      .insert_header((AUTHORIZATION, "Basic Zm9vOmJhcg=="))
      .to_http_request();
    assert_eq!(access_token(&basic, "sb-access-token"), None);
  }
}
