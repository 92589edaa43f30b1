// storefront/src/web/handlers/like_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::services::likes;

#[derive(Deserialize, Debug)]
pub struct LikeRequestPayload {
  pub product_id: i64,
}

/// JSON endpoint: a programmatic caller gets status codes, not redirects.
#[instrument(name = "handler::like_product", skip(ctx, payload), fields(product_id = payload.product_id))]
pub async fn like_product_handler(
  ctx: RequestContext,
  payload: web::Json<LikeRequestPayload>,
) -> Result<HttpResponse, AppError> {
  if ctx.user.is_none() {
    return Ok(HttpResponse::Unauthorized().json(json!({ "error": AppError::Unauthenticated.to_string() })));
  }

  let toggle = likes::toggle_like(&ctx, payload.product_id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": toggle.message(),
    "liked": toggle.liked,
  })))
}
