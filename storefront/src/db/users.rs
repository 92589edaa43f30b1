// storefront/src/db/users.rs

use crate::models::{Role, User};
use chrono::Utc;
use sqlx::SqliteExecutor;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// Looks a user up by username or email; the oldest account wins if the
/// identifier happens to match two different users.
pub async fn find_by_login<'e>(db: impl SqliteExecutor<'e>, identifier: &str) -> sqlx::Result<Option<User>> {
  sqlx::query_as::<_, User>(&format!(
    "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 OR email = ?1 ORDER BY id LIMIT 1"
  ))
  .bind(identifier)
  .fetch_optional(db)
  .await
}

pub async fn email_exists<'e>(db: impl SqliteExecutor<'e>, email: &str) -> sqlx::Result<bool> {
  sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
    .bind(email)
    .fetch_one(db)
    .await
}

pub async fn username_exists<'e>(db: impl SqliteExecutor<'e>, username: &str) -> sqlx::Result<bool> {
  sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
    .bind(username)
    .fetch_one(db)
    .await
}

pub async fn insert<'e>(
  db: impl SqliteExecutor<'e>,
  username: &str,
  email: &str,
  password_hash: &str,
  role: Role,
) -> sqlx::Result<User> {
  sqlx::query_as::<_, User>(&format!(
    "INSERT INTO users (username, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
  ))
  .bind(username)
  .bind(email)
  .bind(password_hash)
  .bind(role)
  .bind(Utc::now())
  .fetch_one(db)
  .await
}
