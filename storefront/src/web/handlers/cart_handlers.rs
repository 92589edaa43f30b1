// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::services::cart;
use crate::session::{FlashCategory, Session};
use crate::web::extractors::CurrentUser;
use crate::web::render;

/// `POST /cart` form body. The id arrives as text so a bad value can be
/// reported as a flash instead of a rejected request.
#[derive(Deserialize, Debug)]
pub struct CartFormPayload {
  #[serde(default)]
  pub product_id: Option<String>,
}

#[instrument(name = "handler::add_to_cart", skip(_user, ctx, session, req), fields(product_id = %path.as_ref()))]
pub async fn add_to_cart_handler(
  _user: CurrentUser,
  ctx: RequestContext,
  session: Session,
  req: HttpRequest,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  cart::add_to_cart(&ctx, path.into_inner()).await?;
  session.flash(FlashCategory::Success, "Item added to cart");
  Ok(render::back_or(&req, "/shop"))
}

#[instrument(name = "handler::view_cart", skip_all)]
pub async fn view_cart_handler(_user: CurrentUser, ctx: RequestContext, session: Session) -> Result<HttpResponse, AppError> {
  let view = cart::view_cart(&ctx).await?;
  Ok(render::page(
    &session,
    "cart.html",
    json!({
      "cart_items": view.lines,
      "total_cart_price": view.total,
    }),
  ))
}

#[instrument(name = "handler::cart_form", skip_all)]
pub async fn cart_form_handler(
  _user: CurrentUser,
  ctx: RequestContext,
  session: Session,
  form: web::Form<CartFormPayload>,
) -> Result<HttpResponse, AppError> {
  let product_id = form
    .into_inner()
    .product_id
    .and_then(|raw| raw.trim().parse::<i64>().ok());

  match product_id {
    None => session.flash(FlashCategory::Danger, "Invalid product ID"),
    Some(product_id) => match cart::set_or_add_to_cart(&ctx, product_id).await {
      Ok(item) if item.quantity > 1 => session.flash(FlashCategory::Success, "Item quantity updated"),
      Ok(_) => session.flash(FlashCategory::Success, "Item added to cart"),
      Err(err) if err.is_user_facing() => {
        warn!(product_id, error = %err, "Cart form rejected.");
        session.flash(FlashCategory::Danger, err.to_string());
      }
      Err(err) => return Err(err),
    },
  }
  Ok(render::redirect("/cart"))
}

#[instrument(name = "handler::remove_from_cart", skip(_user, ctx, session), fields(product_id = %path.as_ref()))]
pub async fn remove_from_cart_handler(
  _user: CurrentUser,
  ctx: RequestContext,
  session: Session,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  match cart::remove_from_cart(&ctx, path.into_inner()).await {
    Ok(()) => {
      info!("Cart line removed.");
      session.flash(FlashCategory::Success, "Item removed from cart");
    }
    Err(AppError::NotFoundInCart) => session.flash(FlashCategory::Danger, AppError::NotFoundInCart.to_string()),
    Err(err) => return Err(err),
  }
  Ok(render::redirect("/cart"))
}
