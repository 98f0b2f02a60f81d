// storefront/src/store/postgres.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::CatalogStore;
use crate::errors::{AppError, Result};
use crate::models::{
  Category, CategoryRef, DashboardStats, NewCategory, NewOrder, NewProduct, Order, OrderListing, OrderStatus,
  Product, ProductFilter, ProductListing, ProductState, ProductStatus, ProductSummary,
};

#[derive(FromRow)]
struct ProductListingRow {
  #[sqlx(flatten)]
  product: Product,
  category_name: Option<String>,
  category_slug: Option<String>,
}

impl From<ProductListingRow> for ProductListing {
  fn from(row: ProductListingRow) -> Self {
    let categories = match (row.category_name, row.category_slug) {
      (Some(name), Some(slug)) => Some(CategoryRef { name, slug }),
      _ => None,
    };
    ProductListing {
      product: row.product,
      categories,
    }
  }
}

#[derive(FromRow)]
struct OrderListingRow {
  #[sqlx(flatten)]
  order: Order,
  product_name: Option<String>,
  product_price: Option<Decimal>,
  product_image_urls: Option<Vec<String>>,
}

impl From<OrderListingRow> for OrderListing {
  fn from(row: OrderListingRow) -> Self {
    let products = match (row.product_name, row.product_price) {
      (Some(name), Some(price)) => Some(ProductSummary {
        name,
        price,
        image_urls: row.product_image_urls.unwrap_or_default(),
      }),
      _ => None,
    };
    OrderListing {
      order: row.order,
      products,
    }
  }
}

/// Turns constraint violations caused by the request into validation errors.
fn map_write_error(err: sqlx::Error) -> AppError {
  if let Some(db_err) = err.as_database_error() {
    if db_err.is_unique_violation() {
      return AppError::Validation("A category with this slug already exists".to_string());
    }
    if db_err.is_foreign_key_violation() {
      return AppError::Validation("Category does not exist".to_string());
    }
    if db_err.is_check_violation() {
      return AppError::Validation("Product data violates catalog rules".to_string());
    }
    // numeric_value_out_of_range
    if db_err.code().as_deref() == Some("22003") {
      return AppError::Validation("Price is too large".to_string());
    }
  }
  AppError::Sqlx(err)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    Ok(Self::new(pool))
  }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  #[instrument(name = "PgStore::list_categories", skip(self), err(Display))]
  async fn list_categories(&self) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
      .fetch_all(&self.pool)
      .await?;
    Ok(categories)
  }

  #[instrument(name = "PgStore::get_category", skip(self), err(Display))]
  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(category)
  }

  #[instrument(name = "PgStore::create_category", skip(self), err(Display))]
  async fn create_category(&self, category: NewCategory) -> Result<Category> {
    sqlx::query_as::<_, Category>("INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING *")
      .bind(&category.name)
      .bind(&category.slug)
      .fetch_one(&self.pool)
      .await
      .map_err(map_write_error)
  }

  #[instrument(name = "PgStore::update_category", skip(self), err(Display))]
  async fn update_category(&self, id: Uuid, category: NewCategory) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>("UPDATE categories SET name = $2, slug = $3 WHERE id = $1 RETURNING *")
      .bind(id)
      .bind(&category.name)
      .bind(&category.slug)
      .fetch_optional(&self.pool)
      .await
      .map_err(map_write_error)
  }

  #[instrument(name = "PgStore::delete_category", skip(self), err(Display))]
  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::list_products", skip(self), err(Display))]
  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<ProductListing>> {
    let rows = sqlx::query_as::<_, ProductListingRow>(
      r#"
      SELECT p.*, c.name AS category_name, c.slug AS category_slug
      FROM products p
      LEFT JOIN categories c ON c.id = p.category_id
      WHERE ($1::product_status IS NULL OR p.status = $1)
        AND ($2::uuid IS NULL OR p.category_id = $2)
      ORDER BY p.created_at DESC
      "#,
    )
    .bind(filter.status())
    .bind(filter.category)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(ProductListing::from).collect())
  }

  #[instrument(name = "PgStore::get_product", skip(self), err(Display))]
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  #[instrument(name = "PgStore::get_products", skip(self), fields(count = ids.len()), err(Display))]
  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  #[instrument(name = "PgStore::create_product", skip(self, product), fields(name = %product.name), err(Display))]
  async fn create_product(&self, product: NewProduct) -> Result<Product> {
    sqlx::query_as::<_, Product>(
      r#"
      INSERT INTO products (name, description, price, category_id, image_urls, status)
      VALUES ($1, $2, $3, $4, $5, 'active')
      RETURNING *
      "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.category_id)
    .bind(&product.image_urls)
    .fetch_one(&self.pool)
    .await
    .map_err(map_write_error)
  }

  #[instrument(name = "PgStore::update_product", skip(self, product), err(Display))]
  async fn update_product(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>(
      r#"
      UPDATE products
      SET name = $2, description = $3, price = $4, category_id = $5, image_urls = $6
      WHERE id = $1
      RETURNING *
      "#,
    )
    .bind(id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.category_id)
    .bind(&product.image_urls)
    .fetch_optional(&self.pool)
    .await
    .map_err(map_write_error)
  }

  #[instrument(name = "PgStore::delete_product", skip(self), err(Display))]
  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::transition_product", skip(self), err(Display))]
  async fn transition_product(&self, id: Uuid, expected: &ProductState, next: &ProductState) -> Result<bool> {
    let result = sqlx::query(
      r#"
      UPDATE products
      SET status = $2, reserved_by = $3
      WHERE id = $1 AND status = $4 AND reserved_by IS NOT DISTINCT FROM $5
      "#,
    )
    .bind(id)
    .bind(next.status)
    .bind(&next.reserved_by)
    .bind(expected.status)
    .bind(&expected.reserved_by)
    .execute(&self.pool)
    .await?;
    let applied = result.rows_affected() == 1;
    if !applied {
      debug!(%id, "Product changed since it was read; transition not applied.");
    }
    Ok(applied)
  }

  #[instrument(name = "PgStore::reserve_active_products", skip(self, token), fields(count = ids.len()), err(Display))]
  async fn reserve_active_products(&self, ids: &[Uuid], token: &str) -> Result<u64> {
    let result = sqlx::query(
      "UPDATE products SET status = $2, reserved_by = $3 WHERE id = ANY($1) AND status = $4",
    )
    .bind(ids)
    .bind(ProductStatus::Reserved)
    .bind(token)
    .bind(ProductStatus::Active)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "PgStore::reserve_all_active", skip(self), fields(count = ids.len()), err(Display))]
  async fn reserve_all_active(&self, ids: &[Uuid]) -> Result<bool> {
    let mut tx = self.pool.begin().await?;
    let result = sqlx::query(
      "UPDATE products SET status = $2, reserved_by = NULL WHERE id = ANY($1) AND status = $3",
    )
    .bind(ids)
    .bind(ProductStatus::Reserved)
    .bind(ProductStatus::Active)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() != ids.len() as u64 {
      warn!(
        requested = ids.len(),
        reservable = result.rows_affected(),
        "Not every product is still active; rolling back reservation."
      );
      tx.rollback().await?;
      return Ok(false);
    }
    tx.commit().await?;
    Ok(true)
  }

  #[instrument(name = "PgStore::insert_orders", skip(self, orders), fields(count = orders.len()), err(Display))]
  async fn insert_orders(&self, orders: Vec<NewOrder>) -> Result<Vec<Order>> {
    let mut tx = self.pool.begin().await?;
    let mut created = Vec::with_capacity(orders.len());
    for new_order in orders {
      let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (product_id, buyer_name, buyer_phone, buyer_email, sinpe_reference, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
      )
      .bind(new_order.product_id)
      .bind(&new_order.buyer.buyer_name)
      .bind(&new_order.buyer.buyer_phone)
      .bind(&new_order.buyer.buyer_email)
      .bind(&new_order.buyer.sinpe_reference)
      .bind(OrderStatus::Pending)
      .fetch_one(&mut *tx)
      .await?;
      created.push(order);
    }
    tx.commit().await?;
    Ok(created)
  }

  #[instrument(name = "PgStore::delete_orders", skip(self), fields(count = ids.len()), err(Display))]
  async fn delete_orders(&self, ids: &[Uuid]) -> Result<u64> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ANY($1)")
      .bind(ids)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "PgStore::get_order", skip(self), err(Display))]
  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  #[instrument(name = "PgStore::list_orders", skip(self), err(Display))]
  async fn list_orders(&self) -> Result<Vec<OrderListing>> {
    let rows = sqlx::query_as::<_, OrderListingRow>(
      r#"
      SELECT o.*, p.name AS product_name, p.price AS product_price, p.image_urls AS product_image_urls
      FROM orders o
      LEFT JOIN products p ON p.id = o.product_id
      ORDER BY o.created_at DESC
      "#,
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(OrderListing::from).collect())
  }

  #[instrument(name = "PgStore::transition_order", skip(self), err(Display))]
  async fn transition_order(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1 AND status = $3")
      .bind(id)
      .bind(to)
      .bind(from)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "PgStore::dashboard_stats", skip(self), err(Display))]
  async fn dashboard_stats(&self) -> Result<DashboardStats> {
    let stats = sqlx::query_as::<_, DashboardStats>(
      r#"
      SELECT
        (SELECT COUNT(*) FROM products) AS total_products,
        (SELECT COUNT(*) FROM products WHERE status = 'active') AS active_products,
        (SELECT COUNT(*) FROM orders) AS total_orders,
        (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders
      "#,
    )
    .fetch_one(&self.pool)
    .await?;
    Ok(stats)
  }
}
