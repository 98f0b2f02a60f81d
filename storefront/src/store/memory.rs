// storefront/src/store/memory.rs

//! Process-local `CatalogStore`. Every operation takes the lock once, so each
//! call is atomic with respect to the others.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::errors::{AppError, Result};
use crate::models::{
  Category, CategoryRef, DashboardStats, NewCategory, NewOrder, NewProduct, Order, OrderListing, OrderStatus,
  Product, ProductFilter, ProductListing, ProductState, ProductStatus, ProductSummary,
};

#[derive(Debug, Default)]
struct Tables {
  // Kept in insertion order, which is also creation order.
  categories: Vec<Category>,
  products: Vec<Product>,
  orders: Vec<Order>,
}

impl Tables {
  fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> Result<()> {
    if self.categories.iter().any(|c| c.slug == slug && Some(c.id) != except) {
      return Err(AppError::Validation("A category with this slug already exists".to_string()));
    }
    Ok(())
  }

  fn ensure_category_exists(&self, category_id: Option<Uuid>) -> Result<()> {
    match category_id {
      Some(id) if !self.categories.iter().any(|c| c.id == id) => {
        Err(AppError::Validation("Category does not exist".to_string()))
      }
      _ => Ok(()),
    }
  }

  fn product_mut(&mut self, id: Uuid) -> Option<&mut Product> {
    self.products.iter_mut().find(|p| p.id == id)
  }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn list_categories(&self) -> Result<Vec<Category>> {
    let mut categories = self.tables.read().categories.clone();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
  }

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    Ok(self.tables.read().categories.iter().find(|c| c.id == id).cloned())
  }

  async fn create_category(&self, category: NewCategory) -> Result<Category> {
    let mut tables = self.tables.write();
    tables.ensure_slug_free(&category.slug, None)?;
    let created = Category {
      id: Uuid::new_v4(),
      name: category.name,
      slug: category.slug,
      created_at: Utc::now(),
    };
    tables.categories.push(created.clone());
    Ok(created)
  }

  async fn update_category(&self, id: Uuid, category: NewCategory) -> Result<Option<Category>> {
    let mut tables = self.tables.write();
    tables.ensure_slug_free(&category.slug, Some(id))?;
    let Some(existing) = tables.categories.iter_mut().find(|c| c.id == id) else {
      return Ok(None);
    };
    existing.name = category.name;
    existing.slug = category.slug;
    Ok(Some(existing.clone()))
  }

  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.categories.len();
    tables.categories.retain(|c| c.id != id);
    if tables.categories.len() == before {
      return Ok(false);
    }
    for product in tables.products.iter_mut().filter(|p| p.category_id == Some(id)) {
      product.category_id = None;
    }
    Ok(true)
  }

  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductListing>> {
    let tables = self.tables.read();
    let status = filter.status();
    let listings = tables
      .products
      .iter()
      .rev()
      .filter(|p| status.map_or(true, |s| p.status == s))
      .filter(|p| filter.category.map_or(true, |c| p.category_id == Some(c)))
      .map(|p| ProductListing {
        product: p.clone(),
        categories: p
          .category_id
          .and_then(|cid| tables.categories.iter().find(|c| c.id == cid))
          .map(|c| CategoryRef {
            name: c.name.clone(),
            slug: c.slug.clone(),
          }),
      })
      .collect();
    Ok(listings)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.tables.read().products.iter().find(|p| p.id == id).cloned())
  }

  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(tables.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
  }

  async fn create_product(&self, product: NewProduct) -> Result<Product> {
    let mut tables = self.tables.write();
    tables.ensure_category_exists(product.category_id)?;
    let created = Product {
      id: Uuid::new_v4(),
      name: product.name,
      description: product.description,
      price: product.price,
      status: ProductStatus::Active,
      category_id: product.category_id,
      image_urls: product.image_urls,
      reserved_by: None,
      created_at: Utc::now(),
    };
    tables.products.push(created.clone());
    Ok(created)
  }

  async fn update_product(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    tables.ensure_category_exists(product.category_id)?;
    let Some(existing) = tables.product_mut(id) else {
      return Ok(None);
    };
    existing.name = product.name;
    existing.description = product.description;
    existing.price = product.price;
    existing.category_id = product.category_id;
    existing.image_urls = product.image_urls;
    Ok(Some(existing.clone()))
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.products.len();
    tables.products.retain(|p| p.id != id);
    if tables.products.len() == before {
      return Ok(false);
    }
    for order in tables.orders.iter_mut().filter(|o| o.product_id == Some(id)) {
      order.product_id = None;
    }
    Ok(true)
  }

  async fn transition_product(&self, id: Uuid, expected: &ProductState, next: &ProductState) -> Result<bool> {
    let mut tables = self.tables.write();
    match tables.product_mut(id) {
      Some(product) if product.state() == *expected => {
        product.status = next.status;
        product.reserved_by = next.reserved_by.clone();
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn reserve_active_products(&self, ids: &[Uuid], token: &str) -> Result<u64> {
    let mut tables = self.tables.write();
    let mut reserved = 0;
    for product in tables
      .products
      .iter_mut()
      .filter(|p| ids.contains(&p.id) && p.status == ProductStatus::Active)
    {
      product.status = ProductStatus::Reserved;
      product.reserved_by = Some(token.to_string());
      reserved += 1;
    }
    Ok(reserved)
  }

  async fn reserve_all_active(&self, ids: &[Uuid]) -> Result<bool> {
    let mut tables = self.tables.write();
    let all_active = ids.iter().all(|id| {
      tables
        .products
        .iter()
        .any(|p| p.id == *id && p.status == ProductStatus::Active)
    });
    if !all_active {
      return Ok(false);
    }
    for product in tables.products.iter_mut().filter(|p| ids.contains(&p.id)) {
      product.status = ProductStatus::Reserved;
      product.reserved_by = None;
    }
    Ok(true)
  }

  async fn insert_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>> {
    let mut tables = self.tables.write();
    let created: Vec<Order> = orders
      .into_iter()
      .map(|o| Order {
        id: Uuid::new_v4(),
        product_id: Some(o.product_id),
        buyer_name: o.buyer.buyer_name,
        buyer_phone: o.buyer.buyer_phone,
        buyer_email: o.buyer.buyer_email,
        sinpe_reference: o.buyer.sinpe_reference,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
      })
      .collect();
    tables.orders.extend(created.iter().cloned());
    Ok(created)
  }

  async fn delete_orders(&self, ids: &[Uuid]) -> Result<u64> {
    let mut tables = self.tables.write();
    let before = tables.orders.len();
    tables.orders.retain(|o| !ids.contains(&o.id));
    Ok((before - tables.orders.len()) as u64)
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn list_orders(&self) -> Result<Vec<OrderListing>> {
    let tables = self.tables.read();
    let listings = tables
      .orders
      .iter()
      .rev()
      .map(|o| OrderListing {
        order: o.clone(),
        products: o
          .product_id
          .and_then(|pid| tables.products.iter().find(|p| p.id == pid))
          .map(|p| ProductSummary {
            name: p.name.clone(),
            price: p.price,
            image_urls: p.image_urls.clone(),
          }),
      })
      .collect();
    Ok(listings)
  }

  async fn transition_order(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool> {
    let mut tables = self.tables.write();
    match tables.orders.iter_mut().find(|o| o.id == id) {
      Some(order) if order.status == from => {
        order.status = to;
        Ok(true)
      }
      _ => Ok(false),
    }
  }

  async fn dashboard_stats(&self) -> Result<DashboardStats> {
    let tables = self.tables.read();
    let count = |n: usize| n as i64;
    Ok(DashboardStats {
      total_products: count(tables.products.len()),
      active_products: count(tables.products.iter().filter(|p| p.status == ProductStatus::Active).count()),
      total_orders: count(tables.orders.len()),
      pending_orders: count(tables.orders.iter().filter(|o| o.status == OrderStatus::Pending).count()),
    })
  }
}
