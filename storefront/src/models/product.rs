// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::category::CategoryRef;
use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "product_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
  Active,
  Reserved,
  Sold,
}

impl ProductStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProductStatus::Active => "active",
      ProductStatus::Reserved => "reserved",
      ProductStatus::Sold => "sold",
    }
  }
}

impl fmt::Display for ProductStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ProductStatus {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "active" => Ok(ProductStatus::Active),
      "reserved" => Ok(ProductStatus::Reserved),
      "sold" => Ok(ProductStatus::Sold),
      _ => Err(AppError::Validation(
        "Invalid status. Must be: active, reserved, or sold".to_string(),
      )),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub status: ProductStatus,
  pub category_id: Option<Uuid>,
  pub image_urls: Vec<String>,
  /// The buyer's reservation token. It is a bearer secret, so it never
  /// leaves the server.
  #[serde(skip_serializing)]
  pub reserved_by: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Product {
  pub fn state(&self) -> ProductState {
    ProductState {
      status: self.status,
      reserved_by: self.reserved_by.clone(),
    }
  }
}

/// The two columns every status transition reads and writes together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductState {
  pub status: ProductStatus,
  pub reserved_by: Option<String>,
}

impl ProductState {
  pub fn active() -> Self {
    Self {
      status: ProductStatus::Active,
      reserved_by: None,
    }
  }

  pub fn reserved_by(token: Option<String>) -> Self {
    Self {
      status: ProductStatus::Reserved,
      reserved_by: token,
    }
  }

  pub fn sold() -> Self {
    Self {
      status: ProductStatus::Sold,
      reserved_by: None,
    }
  }
}

/// A product as listed publicly, with its category's name and slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListing {
  #[serde(flatten)]
  pub product: Product,
  pub categories: Option<CategoryRef>,
}

/// Query-string filter for product listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  pub status: Option<String>,
  pub category: Option<Uuid>,
}

impl ProductFilter {
  /// Unknown status values are ignored rather than rejected.
  pub fn status(&self) -> Option<ProductStatus> {
    self.status.as_deref().and_then(|s| s.parse().ok())
  }
}

/// Request body for creating or editing a product. Status is not part of it:
/// it only changes through reservations, orders and the admin status override.
///
/// On update, absent fields keep their stored value and an explicit `null`
/// clears `description` or `category_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
  pub name: Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub description: Option<Option<String>>,
  /// Accepts a JSON number or a numeric string.
  pub price: Option<Value>,
  #[serde(default, deserialize_with = "nullable")]
  pub category_id: Option<Option<Uuid>>,
  pub image_urls: Option<Vec<String>>,
}

/// Tells a present `null` (`Some(None)`) apart from a missing field (`None`).
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// A validated product ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub category_id: Option<Uuid>,
  pub image_urls: Vec<String>,
}

fn clean_description(description: Option<String>) -> Option<String> {
  description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

fn clean_image_urls(urls: Vec<String>) -> Vec<String> {
  urls
    .into_iter()
    .map(|u| u.trim().to_string())
    .filter(|u| !u.is_empty())
    .collect()
}

impl ProductInput {
  /// Validates a new product. Name and price are required.
  pub fn validate(self) -> Result<NewProduct> {
    let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
    let price = match self.price {
      Some(raw) if !name.is_empty() => parse_price(&raw)?,
      _ => return Err(AppError::Validation("Name and price are required".to_string())),
    };

    Ok(NewProduct {
      name,
      description: clean_description(self.description.flatten()),
      price,
      category_id: self.category_id.flatten(),
      image_urls: clean_image_urls(self.image_urls.unwrap_or_default()),
    })
  }

  /// Applies the fields present in this input on top of `current`.
  pub fn merge_onto(self, current: &Product) -> Result<NewProduct> {
    let name = match self.name.map(|n| n.trim().to_string()) {
      Some(name) if name.is_empty() => {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
      }
      Some(name) => name,
      None => current.name.clone(),
    };
    let price = match self.price {
      Some(raw) => parse_price(&raw)?,
      None => current.price,
    };

    Ok(NewProduct {
      name,
      description: match self.description {
        Some(description) => clean_description(description),
        None => current.description.clone(),
      },
      price,
      category_id: self.category_id.unwrap_or(current.category_id),
      image_urls: match self.image_urls {
        Some(urls) => clean_image_urls(urls),
        None => current.image_urls.clone(),
      },
    })
  }
}

/// Prices are stored as `NUMERIC(12, 2)`.
const PRICE_SCALE: u32 = 2;
const PRICE_LIMIT: i64 = 10_000_000_000;

/// Parses a non-negative price from a JSON number or string without going
/// through binary floating point. Anything the price column cannot hold
/// exactly is rejected.
pub fn parse_price(raw: &Value) -> Result<Decimal> {
  let text = match raw {
    Value::Number(n) => n.to_string(),
    Value::String(s) => s.trim().to_string(),
    _ => return Err(AppError::Validation("Price must be a number".to_string())),
  };
  let price = Decimal::from_str(&text)
    .or_else(|_| Decimal::from_scientific(&text))
    .map_err(|_| AppError::Validation("Price must be a number".to_string()))?
    .normalize();
  if price.is_sign_negative() && !price.is_zero() {
    return Err(AppError::Validation("Price cannot be negative".to_string()));
  }
  if price.scale() > PRICE_SCALE {
    return Err(AppError::Validation(
      "Price cannot have more than 2 decimal places".to_string(),
    ));
  }
  if price >= Decimal::from(PRICE_LIMIT) {
    return Err(AppError::Validation("Price is too large".to_string()));
  }
  Ok(price)
}
