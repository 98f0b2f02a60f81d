// storefront/src/services/auth_service.rs

//! Admin session checks. Sessions are issued and stored by the auth provider;
//! this service only asks it who a token belongs to.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::errors::{AppError, Result};

/// The signed-in back-office user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminUser {
  pub id: String,
  #[serde(default)]
  pub email: Option<String>,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
  /// `Ok(None)` when the provider does not recognise `access_token`.
  async fn verify(&self, access_token: &str) -> Result<Option<AdminUser>>;
}

/// Verifies access tokens against Supabase GoTrue (`GET /auth/v1/user`).
pub struct SupabaseAuth {
  client: reqwest::Client,
  user_endpoint: String,
  anon_key: String,
}

impl SupabaseAuth {
  pub fn new(supabase_url: &str, anon_key: &str) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build auth HTTP client: {}", e)))?;
    Ok(Self {
      client,
      user_endpoint: format!("{}/auth/v1/user", supabase_url.trim_end_matches('/')),
      anon_key: anon_key.to_string(),
    })
  }
}

#[async_trait]
impl SessionVerifier for SupabaseAuth {
  #[instrument(name = "SupabaseAuth::verify", skip_all, err(Display))]
  async fn verify(&self, access_token: &str) -> Result<Option<AdminUser>> {
    let response = self
      .client
      .get(&self.user_endpoint)
      .header("apikey", &self.anon_key)
      .bearer_auth(access_token)
      .send()
      .await?;

    match response.status() {
      status if status.is_success() => {
        let user = response.json::<AdminUser>().await?;
        debug!(user_id = %user.id, "Session verified.");
        Ok(Some(user))
      }
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        debug!("Auth provider rejected the session token.");
        Ok(None)
      }
      status => {
        warn!(%status, "Unexpected response from auth provider.");
        Err(AppError::AuthProvider(format!("Auth provider answered {}", status)))
      }
    }
  }
}

/// A fixed token table. Used by tests and local demos.
#[derive(Debug, Clone, Default)]
pub struct StaticSessions {
  sessions: HashMap<String, AdminUser>,
}

impl StaticSessions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_session(mut self, token: &str, user: AdminUser) -> Self {
    self.sessions.insert(token.to_string(), user);
    self
  }
}

#[async_trait]
impl SessionVerifier for StaticSessions {
  async fn verify(&self, access_token: &str) -> Result<Option<AdminUser>> {
    Ok(self.sessions.get(access_token).cloned())
  }
}
