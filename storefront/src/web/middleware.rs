// storefront/src/web/middleware.rs

use crate::session::{Session, SESSION_COOKIE};
use crate::state::AppState;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};
use tracing::debug;

/// Resolves the signed session cookie to a [`Session`] and stores it in the
/// request extensions. A missing, forged or expired cookie leaves the request
/// without a stored session until a handler writes to it; the response then
/// carries the new cookie.
pub async fn session_middleware(
  req: ServiceRequest,
  next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
  let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
    return next.call(req).await;
  };
  let store = state.sessions.clone();

  let existing = req
    .cookie(SESSION_COOKIE)
    .and_then(|cookie| store.verify_cookie(cookie))
    .filter(|id| store.contains(id));
  let session = Session::new(existing, store);

  req.extensions_mut().insert(session.clone());
  let mut res = next.call(req).await?;

  if let Some(cookie) = session.pending_cookie() {
    debug!("Issued a new session cookie.");
    res.response_mut().add_cookie(&cookie)?;
  }
  Ok(res)
}
