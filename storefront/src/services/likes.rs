// storefront/src/services/likes.rs

use crate::context::RequestContext;
use crate::db;
use crate::errors::{is_foreign_key_violation, AppError, Result};
use crate::models::LikeToggle;
use tracing::{debug, instrument};

/// Flips the caller's like on a product.
///
/// Runs in one transaction: delete the pair if present, otherwise insert it.
/// The delete goes first so the transaction holds the write lock before it
/// reads anything; the unique (user_id, product_id) key turns a racing
/// duplicate insert into a no-op instead of a second row.
#[instrument(name = "likes::toggle_like", skip(ctx), err(Display))]
pub async fn toggle_like(ctx: &RequestContext, product_id: i64) -> Result<LikeToggle> {
  let user = ctx.require_user()?;

  let mut tx = ctx.db().begin().await?;

  if db::likes::remove(&mut *tx, user.id, product_id).await? > 0 {
    tx.commit().await?;
    debug!(user_id = user.id, product_id, "Like removed.");
    return Ok(LikeToggle { liked: false });
  }

  if db::products::find_by_id(&mut *tx, product_id).await?.is_none() {
    tx.rollback().await?;
    return Err(AppError::NotFound("Product".to_string()));
  }

  let inserted = db::likes::insert_if_absent(&mut *tx, user.id, product_id)
    .await
    .map_err(|e| {
      if is_foreign_key_violation(&e) {
        AppError::NotFound("Product".to_string())
      } else {
        AppError::Sqlx(e)
      }
    })?;
  tx.commit().await?;

  debug!(user_id = user.id, product_id, inserted, "Like added.");
  Ok(LikeToggle { liked: true })
}
