// storefront/src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub created_at: DateTime<Utc>,
}

/// The part of a category embedded in product listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
  pub name: String,
  pub slug: String,
}

/// Request body for creating or editing a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
  pub name: Option<String>,
  /// Derived from `name` when omitted.
  pub slug: Option<String>,
}

/// A validated category ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
  pub name: String,
  pub slug: String,
}

impl CategoryInput {
  pub fn validate(self) -> Result<NewCategory> {
    let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
      return Err(AppError::Validation("Name is required".to_string()));
    }

    let slug = match self.slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
      Some(slug) => slug,
      None => slugify(&name),
    };
    if !is_valid_slug(&slug) {
      return Err(AppError::Validation(
        "Slug must be lowercase letters and digits separated by single hyphens".to_string(),
      ));
    }

    Ok(NewCategory { name, slug })
  }
}

/// Lowercases `name` and collapses every run of non-alphanumeric characters into
/// a single hyphen, trimming hyphens from both ends.
///
/// Non-ASCII letters count as separators; nothing is transliterated.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_hyphen = false;
  for c in name.chars().flat_map(char::to_lowercase) {
    if c.is_ascii_alphanumeric() {
      if pending_hyphen && !slug.is_empty() {
        slug.push('-');
      }
      pending_hyphen = false;
      slug.push(c);
    } else {
      pending_hyphen = true;
    }
  }
  slug
}

/// `^[a-z0-9]+(?:-[a-z0-9]+)*$`
pub fn is_valid_slug(slug: &str) -> bool {
  !slug.is_empty()
    && slug
      .split('-')
      .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_collapses_separators() {
    assert_eq!(slugify("Electronics"), "electronics");
    assert_eq!(slugify("  Kids' Toys & Games  "), "kids-toys-games");
    assert_eq!(slugify("Home--Garden"), "home-garden");
    assert_eq!(slugify("Ropa de niño"), "ropa-de-ni-o");
    assert_eq!(slugify("!!!"), "");
  }

  #[test]
  fn slug_validation_matches_url_safe_shape() {
    assert!(is_valid_slug("home-garden"));
    assert!(is_valid_slug("tv2"));
    assert!(!is_valid_slug(""));
    assert!(!is_valid_slug("-leading"));
    assert!(!is_valid_slug("trailing-"));
    assert!(!is_valid_slug("double--hyphen"));
    assert!(!is_valid_slug("Upper"));
    assert!(!is_valid_slug("with space"));
  }

  #[test]
  fn input_derives_slug_when_missing() {
    let input = CategoryInput {
      name: Some(" Muebles Antiguos ".to_string()),
      slug: None,
    };
    assert_eq!(
      input.validate().unwrap(),
      NewCategory {
        name: "Muebles Antiguos".to_string(),
        slug: "muebles-antiguos".to_string(),
      }
    );
  }

  #[test]
  fn input_rejects_missing_name_and_bad_slug() {
    assert!(matches!(CategoryInput::default().validate(), Err(AppError::Validation(_))));

    let bad_slug = CategoryInput {
      name: Some("Books".to_string()),
      slug: Some("Books!".to_string()),
    };
    assert!(matches!(bad_slug.validate(), Err(AppError::Validation(_))));

    // A name with nothing slug-worthy in it cannot produce a slug.
    let no_slug = CategoryInput {
      name: Some("???".to_string()),
      slug: None,
    };
    assert!(matches!(no_slug.validate(), Err(AppError::Validation(_))));
  }
}
