// storefront/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One `cart` row: at most one per (user, product).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
  pub id: i64,
  pub user_id: i64,
  pub product_id: i64,
  pub quantity: i64,
  pub added_at: DateTime<Utc>,
}

/// A cart row joined with the product it points at, priced at read time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub id: i64,
  pub product_id: i64,
  pub quantity: i64,
  pub name: String,
  pub price: i64,
  pub file: String,
}

impl CartLine {
  pub fn line_total(&self) -> i64 {
    self.price * self.quantity
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
  pub lines: Vec<CartLine>,
  pub total: i64,
}

impl CartView {
  pub fn from_lines(lines: Vec<CartLine>) -> Self {
    let total = lines.iter().map(CartLine::line_total).sum();
    Self { lines, total }
  }
}
