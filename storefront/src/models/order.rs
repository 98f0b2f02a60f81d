// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Verified,
  Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  /// Null once the referenced product has been deleted.
  pub product_id: Option<Uuid>,
  pub buyer_name: String,
  pub buyer_phone: String,
  pub buyer_email: String,
  pub sinpe_reference: String,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

/// The admin's decision on a pending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderVerdict {
  Verified,
  Rejected,
}

impl OrderVerdict {
  pub fn order_status(self) -> OrderStatus {
    match self {
      OrderVerdict::Verified => OrderStatus::Verified,
      OrderVerdict::Rejected => OrderStatus::Rejected,
    }
  }
}

impl FromStr for OrderVerdict {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "verified" => Ok(OrderVerdict::Verified),
      "rejected" => Ok(OrderVerdict::Rejected),
      _ => Err(AppError::Validation("Invalid status".to_string())),
    }
  }
}

/// Body of `PATCH /orders/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerdictRequest {
  pub status: Option<String>,
}

impl VerdictRequest {
  pub fn verdict(&self) -> Result<OrderVerdict> {
    self
      .status
      .as_deref()
      .ok_or_else(|| AppError::Validation("Invalid status".to_string()))?
      .parse()
  }
}

/// Contact and payment details typed in by the buyer at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerDetails {
  pub buyer_name: String,
  pub buyer_phone: String,
  pub buyer_email: String,
  pub sinpe_reference: String,
}

/// Body of `POST /orders`. Older clients send a single `product_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
  #[serde(default)]
  pub products: Vec<Uuid>,
  pub product_id: Option<Uuid>,
  pub buyer_name: Option<String>,
  pub buyer_phone: Option<String>,
  pub buyer_email: Option<String>,
  pub sinpe_reference: Option<String>,
}

impl CheckoutRequest {
  /// Returns the de-duplicated product ids, in request order, and the buyer's details.
  pub fn validate(self) -> Result<(Vec<Uuid>, BuyerDetails)> {
    let field = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(buyer_name), Some(buyer_phone), Some(buyer_email), Some(sinpe_reference)) = (
      field(self.buyer_name),
      field(self.buyer_phone),
      field(self.buyer_email),
      field(self.sinpe_reference),
    ) else {
      return Err(AppError::Validation("All fields are required".to_string()));
    };

    let mut product_ids: Vec<Uuid> = Vec::with_capacity(self.products.len() + 1);
    for id in self.products.into_iter().chain(self.product_id) {
      if !product_ids.contains(&id) {
        product_ids.push(id);
      }
    }
    if product_ids.is_empty() {
      return Err(AppError::Validation("All fields are required".to_string()));
    }

    Ok((
      product_ids,
      BuyerDetails {
        buyer_name,
        buyer_phone,
        buyer_email,
        sinpe_reference,
      },
    ))
  }
}

/// A pending order about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub product_id: Uuid,
  pub buyer: BuyerDetails,
}

/// The product columns shown next to an order in the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
  pub name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderListing {
  #[serde(flatten)]
  pub order: Order,
  pub products: Option<ProductSummary>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full_request() -> CheckoutRequest {
    CheckoutRequest {
      products: vec![],
      product_id: None,
      buyer_name: Some(" Ana Mora ".to_string()),
      buyer_phone: Some("8888-0000".to_string()),
      buyer_email: Some("ana@example.com".to_string()),
      sinpe_reference: Some("SINPE-123".to_string()),
    }
  }

  #[test]
  fn checkout_collapses_duplicates_and_accepts_legacy_id() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let request = CheckoutRequest {
      products: vec![a, b, a],
      product_id: Some(b),
      ..full_request()
    };
    let (ids, buyer) = request.validate().unwrap();
    assert_eq!(ids, vec![a, b]);
    assert_eq!(buyer.buyer_name, "Ana Mora");

    let legacy = CheckoutRequest {
      product_id: Some(a),
      ..full_request()
    };
    assert_eq!(legacy.validate().unwrap().0, vec![a]);
  }

  #[test]
  fn checkout_requires_every_field_and_a_product() {
    assert!(matches!(full_request().validate(), Err(AppError::Validation(_))));

    let blank_reference = CheckoutRequest {
      products: vec![Uuid::new_v4()],
      sinpe_reference: Some("  ".to_string()),
      ..full_request()
    };
    assert!(matches!(blank_reference.validate(), Err(AppError::Validation(m)) if m == "All fields are required"));
  }

  #[test]
  fn verdict_only_accepts_final_states() {
    assert_eq!("verified".parse::<OrderVerdict>().unwrap(), OrderVerdict::Verified);
    assert_eq!(OrderVerdict::Rejected.order_status(), OrderStatus::Rejected);
    assert!("pending".parse::<OrderVerdict>().is_err());
    assert!(VerdictRequest::default().verdict().is_err());
  }
}
