// storefront/src/web/handlers/pages_handlers.rs

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::services::catalog;
use crate::session::Session;
use crate::web::render;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

#[instrument(name = "handler::index", skip_all)]
pub async fn index_handler(ctx: RequestContext, session: Session) -> Result<HttpResponse, AppError> {
  let top_liked_products = catalog::top_liked(&ctx, catalog::HOME_TOP_LIKED).await?;
  Ok(render::page(
    &session,
    "index.html",
    json!({ "top_liked_products": top_liked_products }),
  ))
}

pub async fn charity_handler(session: Session) -> HttpResponse {
  render::page(&session, "charity.html", json!({}))
}

pub async fn about_us_handler(session: Session) -> HttpResponse {
  render::page(&session, "about.html", json!({}))
}

pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Serves a published product image.
pub async fn static_asset_handler(ctx: RequestContext, path: web::Path<String>) -> Result<HttpResponse, AppError> {
  let (bytes, mime) = ctx.assets().read(&path.into_inner()).await?;
  Ok(HttpResponse::Ok().content_type(mime.to_string()).body(bytes))
}
