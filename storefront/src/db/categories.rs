// storefront/src/db/categories.rs

use crate::models::Category;
use sqlx::SqliteExecutor;

pub async fn list<'e>(db: impl SqliteExecutor<'e>) -> sqlx::Result<Vec<Category>> {
  sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
    .fetch_all(db)
    .await
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> sqlx::Result<Option<Category>> {
  sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?")
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert<'e>(db: impl SqliteExecutor<'e>, name: &str) -> sqlx::Result<Category> {
  sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES (?) RETURNING id, name")
    .bind(name)
    .fetch_one(db)
    .await
}
