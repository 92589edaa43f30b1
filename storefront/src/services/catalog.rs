// storefront/src/services/catalog.rs

use crate::context::RequestContext;
use crate::db;
use crate::errors::{AppError, Result};
use crate::models::{Category, Product, RankedProduct};
use std::collections::HashSet;
use tracing::instrument;

pub const HOME_TOP_LIKED: i64 = 3;

/// All products, or only those whose name contains `query` when one is given.
#[instrument(name = "catalog::list_products", skip(ctx), err(Display))]
pub async fn list_products(ctx: &RequestContext, query: Option<&str>) -> Result<Vec<Product>> {
  let products = match query.map(str::trim).filter(|q| !q.is_empty()) {
    Some(needle) => db::products::search_by_name(ctx.db(), needle).await?,
    None => db::products::list(ctx.db()).await?,
  };
  Ok(products)
}

#[instrument(name = "catalog::list_by_category", skip(ctx), err(Display))]
pub async fn list_by_category(ctx: &RequestContext, category_id: i64) -> Result<(Category, Vec<Product>)> {
  let category = db::categories::find_by_id(ctx.db(), category_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Category".to_string()))?;
  let products = db::products::list_by_category(ctx.db(), category.id).await?;
  Ok((category, products))
}

#[instrument(name = "catalog::get_product", skip(ctx), err(Display))]
pub async fn get_product(ctx: &RequestContext, product_id: i64) -> Result<Product> {
  db::products::find_by_id(ctx.db(), product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// At most `limit` products with at least one like, most liked first.
#[instrument(name = "catalog::top_liked", skip(ctx), err(Display))]
pub async fn top_liked(ctx: &RequestContext, limit: i64) -> Result<Vec<RankedProduct>> {
  Ok(db::products::top_liked(ctx.db(), limit.max(0)).await?)
}

/// Product ids the caller has liked; empty for anonymous callers.
pub async fn liked_set_for(ctx: &RequestContext) -> Result<HashSet<i64>> {
  match &ctx.user {
    Some(user) => Ok(db::likes::product_ids_for_user(ctx.db(), user.id).await?.into_iter().collect()),
    None => Ok(HashSet::new()),
  }
}

pub async fn list_categories(ctx: &RequestContext) -> Result<Vec<Category>> {
  Ok(db::categories::list(ctx.db()).await?)
}
