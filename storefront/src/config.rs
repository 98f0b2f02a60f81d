// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Where durable state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  /// Process-local store for demos and tests. Nothing survives a restart.
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      "memory" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Unknown STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl LogFormat {
  /// Read straight from the environment because logging starts before the
  /// rest of the configuration is loaded.
  pub fn from_env() -> Self {
    match env::var("LOG_FORMAT").map(|v| v.to_ascii_lowercase()) {
      Ok(v) if v == "json" => LogFormat::Json,
      _ => LogFormat::Text,
    }
  }
}

/// Connection details for the S3-compatible bucket holding product images.
#[derive(Clone)]
pub struct ObjectStoreConfig {
  pub endpoint: String,
  pub access_key_id: String,
  pub secret_access_key: String,
  pub bucket: String,
  pub public_url: String,
  pub upload_url_ttl: Duration,
}

impl std::fmt::Debug for ObjectStoreConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ObjectStoreConfig")
      .field("endpoint", &self.endpoint)
      .field("access_key_id", &self.access_key_id)
      .field("secret_access_key", &"[REDACTED]")
      .field("bucket", &self.bucket)
      .field("public_url", &self.public_url)
      .field("upload_url_ttl", &self.upload_url_ttl)
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub store_backend: StoreBackend,
  /// Required for the Postgres backend.
  pub database_url: Option<String>,
  pub run_migrations: bool,
  pub seed_db: bool,

  pub supabase_url: String,
  pub supabase_anon_key: String,
  pub session_cookie_name: String,

  pub object_store: ObjectStoreConfig,

  // Shown to buyers next to the checkout form.
  pub sinpe_phone: String,
  pub sinpe_name: String,

  pub enable_reserve: bool,
}

fn parse_bool(var_name: &str, raw: &str) -> Result<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" => Ok(false),
    other => Err(AppError::Config(format!("Invalid {} value: '{}'", var_name, other))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let required = |name: &str| {
      optional(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };
    let flag = |name: &str, default: bool| match optional(name) {
      Some(raw) => parse_bool(name, &raw),
      None => Ok(default),
    };

    let server_host = optional("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = optional("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let store_backend = match optional("STORE_BACKEND") {
      Some(raw) => raw.parse::<StoreBackend>()?,
      None => StoreBackend::Postgres,
    };
    let database_url = optional("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required by the postgres backend)".to_string(),
      ));
    }

    let upload_url_ttl_secs = optional("UPLOAD_URL_TTL_SECS")
      .unwrap_or_else(|| "3600".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid UPLOAD_URL_TTL_SECS: {}", e)))?;

    let object_store = ObjectStoreConfig {
      endpoint: required("R2_ENDPOINT")?,
      access_key_id: required("R2_ACCESS_KEY_ID")?,
      secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
      bucket: required("R2_BUCKET_NAME")?,
      public_url: required("R2_PUBLIC_URL")?.trim_end_matches('/').to_string(),
      upload_url_ttl: Duration::from_secs(upload_url_ttl_secs),
    };

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      run_migrations: flag("RUN_MIGRATIONS", false)?,
      seed_db: flag("SEED_DB", false)?,
      supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
      supabase_anon_key: required("SUPABASE_ANON_KEY")?,
      session_cookie_name: optional("SESSION_COOKIE_NAME").unwrap_or_else(|| "sb-access-token".to_string()),
      object_store,
      sinpe_phone: optional("SINPE_PHONE").unwrap_or_default(),
      sinpe_name: optional("SINPE_NAME").unwrap_or_default(),
      enable_reserve: flag("ENABLE_RESERVE", true)?,
    };

    tracing::info!(
      backend = ?config.store_backend,
      reservations_enabled = config.enable_reserve,
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
