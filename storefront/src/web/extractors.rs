// storefront/src/web/extractors.rs

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::session::{FlashCategory, Session, SessionUser};
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

fn session_of(req: &HttpRequest) -> Result<Session, AppError> {
  req
    .extensions()
    .get::<Session>()
    .cloned()
    .ok_or_else(|| AppError::Internal("Session middleware is not installed".to_string()))
}

/// Flashes the login prompt and fails with `Unauthenticated` (a redirect to `/login`).
fn login_required(req: &HttpRequest) -> AppError {
  if let Ok(session) = session_of(req) {
    session.flash(FlashCategory::Info, AppError::Unauthenticated.to_string());
  }
  warn!(path = %req.path(), "Anonymous request to a login-only page.");
  AppError::Unauthenticated
}

impl FromRequest for Session {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(session_of(req))
  }
}

/// The logged-in user; anonymous callers are sent to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = match session_of(req) {
      Ok(session) => session.user().map(CurrentUser).ok_or_else(|| login_required(req)),
      Err(e) => Err(e),
    };
    ready(result)
  }
}

/// A logged-in user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = match session_of(req).map(|s| s.user()) {
      Ok(Some(user)) if user.is_admin() => Ok(AdminUser(user)),
      Ok(Some(user)) => {
        warn!(user_id = user.id, path = %req.path(), "Non-admin request to an admin page.");
        Err(AppError::Forbidden)
      }
      Ok(None) => Err(login_required(req)),
      Err(e) => Err(e),
    };
    ready(result)
  }
}

impl FromRequest for RequestContext {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = match req.app_data::<web::Data<AppState>>() {
      Some(state) => {
        let user = req.extensions().get::<Session>().and_then(Session::user);
        Ok(RequestContext::new(state.get_ref().clone(), user))
      }
      None => Err(AppError::Internal("AppState is not registered".to_string())),
    };
    ready(result)
  }
}
