// storefront/src/services/seed.rs

//! Demo catalog for local runs.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::{NewCategory, NewProduct};
use crate::store::CatalogStore;

const DEMO_CATALOG: &[(&str, &str, &[(&str, &str, i64)])] = &[
  (
    "Muebles",
    "muebles",
    &[
      ("Mesa de comedor", "Madera maciza, seis sillas incluidas.", 85_000),
      ("Sillón reclinable", "Tapizado gris, poco uso.", 60_000),
    ],
  ),
  (
    "Electrónicos",
    "electronicos",
    &[
      ("Televisor 42\"", "Funciona perfecto, con control remoto.", 120_000),
      ("Parlante Bluetooth", "Batería de 10 horas.", 15_000),
    ],
  ),
  ("Ropa", "ropa", &[("Chaqueta de invierno", "Talla M.", 12_500)]),
];

/// Inserts the demo catalog when the store has no categories yet.
/// Returns the number of products created.
#[instrument(name = "seed::seed_demo_catalog", skip_all, err(Display))]
pub async fn seed_demo_catalog(store: &dyn CatalogStore) -> Result<usize> {
  if !store.list_categories().await?.is_empty() {
    info!("Catalog already has categories; skipping seed.");
    return Ok(0);
  }

  let mut created = 0;
  for (name, slug, products) in DEMO_CATALOG {
    let category = store
      .create_category(NewCategory {
        name: name.to_string(),
        slug: slug.to_string(),
      })
      .await?;
    for (product_name, description, price) in products.iter() {
      store
        .create_product(NewProduct {
          name: product_name.to_string(),
          description: Some(description.to_string()),
          price: Decimal::from(*price),
          category_id: Some(category.id),
          image_urls: vec![],
        })
        .await?;
      created += 1;
    }
  }

  info!(products = created, "Demo catalog seeded.");
  Ok(created)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ProductFilter;
  use crate::store::MemoryStore;

  #[tokio::test]
  async fn seeds_once() {
    let store = MemoryStore::new();
    assert_eq!(seed_demo_catalog(&store).await.unwrap(), 5);
    assert_eq!(seed_demo_catalog(&store).await.unwrap(), 0);
    assert_eq!(store.list_products(&ProductFilter::default()).await.unwrap().len(), 5);
    assert_eq!(store.list_categories().await.unwrap().len(), 3);
  }
}
