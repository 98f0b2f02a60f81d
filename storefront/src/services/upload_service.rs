// storefront/src/services/upload_service.rs

//! Presigned uploads for product images. The browser PUTs the bytes straight
//! to the bucket; the service never handles them.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder as S3ConfigBuilder, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, instrument};

use crate::config::ObjectStoreConfig;
use crate::errors::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
  pub upload_url: String,
  pub public_url: String,
  pub key: String,
}

#[async_trait]
pub trait UploadSigner: Send + Sync {
  async fn presign_put(&self, key: &str, content_type: &str) -> Result<PresignedUpload>;
}

/// Cloudflare R2 through its S3-compatible API.
pub struct R2Signer {
  client: S3Client,
  bucket: String,
  public_url: String,
  ttl: Duration,
}

impl R2Signer {
  pub fn new(config: &ObjectStoreConfig) -> Self {
    let credentials = Credentials::new(
      config.access_key_id.clone(),
      config.secret_access_key.clone(),
      None,
      None,
      "garage-storefront",
    );
    let s3_config = S3ConfigBuilder::new()
      .behavior_version(BehaviorVersion::latest())
      .endpoint_url(&config.endpoint)
      .region(Region::new("auto"))
      .credentials_provider(credentials)
      .force_path_style(true)
      .build();

    Self {
      client: S3Client::from_conf(s3_config),
      bucket: config.bucket.clone(),
      public_url: config.public_url.clone(),
      ttl: config.upload_url_ttl,
    }
  }
}

#[async_trait]
impl UploadSigner for R2Signer {
  #[instrument(name = "R2Signer::presign_put", skip(self), err(Display))]
  async fn presign_put(&self, key: &str, content_type: &str) -> Result<PresignedUpload> {
    let presigning = PresigningConfig::expires_in(self.ttl).map_err(|e| {
      error!(error = %e, "Failed to create presigning config");
      AppError::Storage(e.to_string())
    })?;

    let presigned = self
      .client
      .put_object()
      .bucket(&self.bucket)
      .key(key)
      .content_type(content_type)
      .presigned(presigning)
      .await
      .map_err(|e| {
        error!(%key, error = %e, "Failed to generate presigned upload URL");
        AppError::Storage(e.to_string())
      })?;

    Ok(PresignedUpload {
      upload_url: presigned.uri().to_string(),
      public_url: public_object_url(&self.public_url, key),
      key: key.to_string(),
    })
  }
}

pub fn public_object_url(public_base: &str, key: &str) -> String {
  format!("{}/{}", public_base.trim_end_matches('/'), key)
}

/// `products/<millis>-<suffix>-<filename>`, with the filename reduced to
/// characters that are safe in a URL path segment.
pub fn build_object_key(filename: &str, unix_millis: i64, suffix: &str) -> String {
  let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
  let mut sanitized: String = base
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();
  if sanitized.trim_matches(['.', '_']).is_empty() {
    sanitized = "upload".to_string();
  }
  format!("products/{}-{}-{}", unix_millis, suffix, sanitized)
}

pub fn random_suffix() -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(8)
    .map(|b| char::from(b).to_ascii_lowercase())
    .collect()
}
