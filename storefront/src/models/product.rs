// storefront/src/models/product.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub price: i64,   // minor units, currency-agnostic
  pub file: String, // public path of the product image, e.g. /static/goggle1.jpg
  pub category_id: Option<i64>,
}

/// A product paired with how many users liked it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RankedProduct {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub product: Product,
  pub likes: i64,
}
