// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::services::identity::{self, Credentials, Registration};
use crate::session::{FlashCategory, Session, SessionUser};
use crate::web::extractors::CurrentUser;
use crate::web::render;

const REGISTER_TEMPLATE: &str = "register.html";
const LOGIN_TEMPLATE: &str = "login.html";

pub async fn register_form_handler(session: Session) -> HttpResponse {
  render::page(&session, REGISTER_TEMPLATE, json!({ "form": {} }))
}

#[instrument(name = "handler::register", skip_all, fields(username = %form.username))]
pub async fn register_handler(
  ctx: RequestContext,
  session: Session,
  form: web::Form<Registration>,
) -> Result<HttpResponse, AppError> {
  let form = form.into_inner();
  match identity::register(&ctx, &form).await {
    Ok(user) => {
      let message = if user.is_admin() {
        "Admin registration was successful!"
      } else {
        "Registration was successful!"
      };
      session.login(SessionUser::from(&user));
      session.flash(FlashCategory::Success, message);
      Ok(render::redirect("/"))
    }
    Err(err) => render::form_failure(
      &session,
      err,
      REGISTER_TEMPLATE,
      // Echo back what was typed, except the password.
      json!({ "form": { "username": form.username, "email": form.email, "role": form.role } }),
    ),
  }
}

pub async fn login_form_handler(session: Session) -> HttpResponse {
  render::page(&session, LOGIN_TEMPLATE, json!({ "form": {} }))
}

#[instrument(name = "handler::login", skip_all)]
pub async fn login_handler(
  ctx: RequestContext,
  session: Session,
  form: web::Form<Credentials>,
) -> Result<HttpResponse, AppError> {
  let form = form.into_inner();
  match identity::login(&ctx, &form).await {
    Ok(user) => {
      let message = if user.is_admin() {
        "Successfully logged in as admin"
      } else {
        "Successfully logged in"
      };
      session.login(SessionUser::from(&user));
      session.flash(FlashCategory::Success, message);
      Ok(render::redirect("/"))
    }
    Err(err) => render::form_failure(
      &session,
      err,
      LOGIN_TEMPLATE,
      json!({ "form": { "username": form.username, "email": form.email } }),
    ),
  }
}

pub async fn logout_handler(CurrentUser(user): CurrentUser, session: Session) -> HttpResponse {
  session.logout();
  info!(user_id = user.id, "User logged out.");
  render::redirect("/")
}
