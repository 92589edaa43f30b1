// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::services::catalog;
use crate::session::Session;
use crate::web::render;

#[derive(Deserialize, Debug)]
pub struct ShopQuery {
  pub q: Option<String>,
}

#[instrument(name = "handler::shop", skip(ctx, session))]
pub async fn shop_handler(
  ctx: RequestContext,
  session: Session,
  query: web::Query<ShopQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner().q;
  let products = catalog::list_products(&ctx, query.as_deref()).await?;
  let mut liked_products: Vec<i64> = catalog::liked_set_for(&ctx).await?.into_iter().collect();
  liked_products.sort_unstable();
  debug!(count = products.len(), "Products listed.");

  Ok(render::page(
    &session,
    "shop.html",
    json!({
      "products": products,
      "liked_products": liked_products,
      "query": query,
    }),
  ))
}

#[instrument(name = "handler::category", skip(ctx, session), fields(category_id = %path.as_ref()))]
pub async fn category_handler(
  ctx: RequestContext,
  session: Session,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let (category, products) = catalog::list_by_category(&ctx, path.into_inner()).await?;
  let mut liked_products: Vec<i64> = catalog::liked_set_for(&ctx).await?.into_iter().collect();
  liked_products.sort_unstable();

  Ok(render::page(
    &session,
    "shop.html",
    json!({
      "category": category,
      "products": products,
      "liked_products": liked_products,
    }),
  ))
}

#[instrument(name = "handler::details", skip(ctx, session), fields(product_id = %path.as_ref()))]
pub async fn details_handler(
  ctx: RequestContext,
  session: Session,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product = catalog::get_product(&ctx, path.into_inner()).await?;
  Ok(render::page(&session, "details.html", json!({ "product": product })))
}
