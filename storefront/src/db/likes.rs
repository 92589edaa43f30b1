// storefront/src/db/likes.rs

use sqlx::SqliteExecutor;

/// Returns the number of rows removed (0 or 1).
pub async fn remove<'e>(db: impl SqliteExecutor<'e>, user_id: i64, product_id: i64) -> sqlx::Result<u64> {
  let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND product_id = ?")
    .bind(user_id)
    .bind(product_id)
    .execute(db)
    .await?;
  Ok(result.rows_affected())
}

/// Inserts the like unless the pair already exists; returns whether a row was added.
pub async fn insert_if_absent<'e>(db: impl SqliteExecutor<'e>, user_id: i64, product_id: i64) -> sqlx::Result<bool> {
  let result = sqlx::query("INSERT INTO likes (user_id, product_id) VALUES (?, ?) ON CONFLICT (user_id, product_id) DO NOTHING")
    .bind(user_id)
    .bind(product_id)
    .execute(db)
    .await?;
  Ok(result.rows_affected() == 1)
}

pub async fn product_ids_for_user<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> sqlx::Result<Vec<i64>> {
  sqlx::query_scalar("SELECT product_id FROM likes WHERE user_id = ? AND product_id IS NOT NULL")
    .bind(user_id)
    .fetch_all(db)
    .await
}
