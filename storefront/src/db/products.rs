// storefront/src/db/products.rs

use crate::models::{Product, RankedProduct};
use sqlx::SqliteExecutor;

const PRODUCT_COLUMNS: &str = "id, name, price, file, category_id";

pub async fn list<'e>(db: impl SqliteExecutor<'e>) -> sqlx::Result<Vec<Product>> {
  sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
    .fetch_all(db)
    .await
}

/// Products whose name contains `needle` literally (LIKE wildcards in the
/// needle are escaped).
pub async fn search_by_name<'e>(db: impl SqliteExecutor<'e>, needle: &str) -> sqlx::Result<Vec<Product>> {
  sqlx::query_as::<_, Product>(&format!(
    r"SELECT {PRODUCT_COLUMNS} FROM products WHERE name LIKE ? ESCAPE '\' ORDER BY id"
  ))
  .bind(format!("%{}%", escape_like(needle)))
  .fetch_all(db)
  .await
}

pub async fn list_by_category<'e>(db: impl SqliteExecutor<'e>, category_id: i64) -> sqlx::Result<Vec<Product>> {
  sqlx::query_as::<_, Product>(&format!(
    "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = ? ORDER BY id"
  ))
  .bind(category_id)
  .fetch_all(db)
  .await
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> sqlx::Result<Option<Product>> {
  sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert<'e>(
  db: impl SqliteExecutor<'e>,
  name: &str,
  price: i64,
  file: &str,
  category_id: Option<i64>,
) -> sqlx::Result<Product> {
  sqlx::query_as::<_, Product>(&format!(
    "INSERT INTO products (name, price, file, category_id) VALUES (?, ?, ?, ?) RETURNING {PRODUCT_COLUMNS}"
  ))
  .bind(name)
  .bind(price)
  .bind(file)
  .bind(category_id)
  .fetch_one(db)
  .await
}

/// Rewrites name, price and category; `file` is only replaced when given.
pub async fn update<'e>(
  db: impl SqliteExecutor<'e>,
  id: i64,
  name: &str,
  price: i64,
  category_id: Option<i64>,
  file: Option<&str>,
) -> sqlx::Result<Option<Product>> {
  sqlx::query_as::<_, Product>(&format!(
    "UPDATE products SET name = ?, price = ?, category_id = ?, file = COALESCE(?, file) WHERE id = ? RETURNING {PRODUCT_COLUMNS}"
  ))
  .bind(name)
  .bind(price)
  .bind(category_id)
  .bind(file)
  .bind(id)
  .fetch_optional(db)
  .await
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: i64) -> sqlx::Result<u64> {
  let result = sqlx::query("DELETE FROM products WHERE id = ?")
    .bind(id)
    .execute(db)
    .await?;
  Ok(result.rows_affected())
}

/// Most-liked products first. The inner join leaves out products nobody liked;
/// equal counts keep insertion order.
pub async fn top_liked<'e>(db: impl SqliteExecutor<'e>, limit: i64) -> sqlx::Result<Vec<RankedProduct>> {
  sqlx::query_as::<_, RankedProduct>(
    "SELECT p.id, p.name, p.price, p.file, p.category_id, COUNT(l.id) AS likes \
     FROM products p \
     JOIN likes l ON l.product_id = p.id \
     GROUP BY p.id \
     ORDER BY likes DESC, p.id ASC \
     LIMIT ?",
  )
  .bind(limit)
  .fetch_all(db)
  .await
}

fn escape_like(raw: &str) -> String {
  let mut escaped = String::with_capacity(raw.len());
  for ch in raw.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped
}
