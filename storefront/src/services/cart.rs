// storefront/src/services/cart.rs

//! The signed-in user's cart.
//!
//! A repeat add never creates a second row: `db::cart::add_one` is a single
//! upsert on the unique (user_id, product_id) key, so concurrent adds of the
//! same product each land as one `quantity + 1`.

use crate::context::RequestContext;
use crate::db;
use crate::errors::{is_foreign_key_violation, AppError, Result};
use crate::models::{CartItem, CartView};
use tracing::{info, instrument};

#[instrument(name = "cart::add_to_cart", skip(ctx), err(Display))]
pub async fn add_to_cart(ctx: &RequestContext, product_id: i64) -> Result<CartItem> {
  let user = ctx.require_user()?;

  if db::products::find_by_id(ctx.db(), product_id).await?.is_none() {
    return Err(AppError::NotFound("Product".to_string()));
  }

  let item = db::cart::add_one(ctx.db(), user.id, product_id).await.map_err(|e| {
    // The product was deleted between the lookup and the upsert.
    if is_foreign_key_violation(&e) {
      AppError::NotFound("Product".to_string())
    } else {
      AppError::Sqlx(e)
    }
  })?;

  info!(user_id = user.id, product_id, quantity = item.quantity, "Cart updated.");
  Ok(item)
}

/// Form-driven variant of [`add_to_cart`]; same merge semantics.
pub async fn set_or_add_to_cart(ctx: &RequestContext, product_id: i64) -> Result<CartItem> {
  add_to_cart(ctx, product_id).await
}

#[instrument(name = "cart::remove_from_cart", skip(ctx), err(Display))]
pub async fn remove_from_cart(ctx: &RequestContext, product_id: i64) -> Result<()> {
  let user = ctx.require_user()?;
  match db::cart::remove(ctx.db(), user.id, product_id).await? {
    0 => Err(AppError::NotFoundInCart),
    _ => Ok(()),
  }
}

/// Cart lines with the total computed from current product prices.
#[instrument(name = "cart::view_cart", skip(ctx), err(Display))]
pub async fn view_cart(ctx: &RequestContext) -> Result<CartView> {
  let user = ctx.require_user()?;
  let lines = db::cart::lines_for_user(ctx.db(), user.id).await?;
  Ok(CartView::from_lines(lines))
}
