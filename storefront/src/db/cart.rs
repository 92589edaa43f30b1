// storefront/src/db/cart.rs

use crate::models::{CartItem, CartLine};
use chrono::Utc;
use sqlx::SqliteExecutor;

const CART_COLUMNS: &str = "id, user_id, product_id, quantity, added_at";

/// Adds one unit of the product to the user's cart in a single statement:
/// the unique (user_id, product_id) key turns a repeat add into `quantity + 1`.
pub async fn add_one<'e>(db: impl SqliteExecutor<'e>, user_id: i64, product_id: i64) -> sqlx::Result<CartItem> {
  sqlx::query_as::<_, CartItem>(&format!(
    "INSERT INTO cart (user_id, product_id, quantity, added_at) VALUES (?, ?, 1, ?) \
     ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = cart.quantity + 1 \
     RETURNING {CART_COLUMNS}"
  ))
  .bind(user_id)
  .bind(product_id)
  .bind(Utc::now())
  .fetch_one(db)
  .await
}

pub async fn lines_for_user<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> sqlx::Result<Vec<CartLine>> {
  sqlx::query_as::<_, CartLine>(
    "SELECT c.id, c.product_id, c.quantity, p.name, p.price, p.file \
     FROM cart c \
     JOIN products p ON p.id = c.product_id \
     WHERE c.user_id = ? \
     ORDER BY c.id",
  )
  .bind(user_id)
  .fetch_all(db)
  .await
}

/// Returns the number of rows removed (0 or 1).
pub async fn remove<'e>(db: impl SqliteExecutor<'e>, user_id: i64, product_id: i64) -> sqlx::Result<u64> {
  let result = sqlx::query("DELETE FROM cart WHERE user_id = ? AND product_id = ?")
    .bind(user_id)
    .bind(product_id)
    .execute(db)
    .await?;
  Ok(result.rows_affected())
}
