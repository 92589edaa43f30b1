// storefront/src/web/render.rs

//! Page responses.
//!
//! Pages are rendered as JSON view models: the template name, the signed-in
//! user, the drained flash messages, form errors, and the page data.

use crate::errors::{AppError, FieldError};
use crate::session::{Flash, FlashCategory, Session, SessionUser};
use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct PageView<'a> {
  pub template: &'a str,
  pub current_user: Option<SessionUser>,
  pub flashes: Vec<Flash>,
  pub errors: &'a [FieldError],
  pub context: Value,
}

pub fn page(session: &Session, template: &str, context: Value) -> HttpResponse {
  form_page(session, StatusCode::OK, template, &[], context)
}

pub fn form_page(session: &Session, status: StatusCode, template: &str, errors: &[FieldError], context: Value) -> HttpResponse {
  let view = PageView {
    template,
    current_user: session.user(),
    flashes: session.take_flashes(),
    errors,
    context,
  };
  HttpResponse::build(status).json(view)
}

/// Re-renders a form after a recoverable failure: field errors go next to
/// the fields, any other domain error becomes a flash. Infrastructure errors
/// are passed through.
pub fn form_failure(session: &Session, err: AppError, template: &str, context: Value) -> Result<HttpResponse, AppError> {
  if !err.is_user_facing() {
    return Err(err);
  }
  let status = actix_web::ResponseError::status_code(&err);
  if !matches!(err, AppError::Validation(_)) {
    session.flash(FlashCategory::Danger, err.to_string());
  }
  Ok(form_page(session, status, template, err.field_errors(), context))
}

pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, location))
    .finish()
}

/// Redirects to the referring page when it is on this site, else to `fallback`.
pub fn back_or(req: &HttpRequest, fallback: &str) -> HttpResponse {
  let host = req.connection_info().host().to_string();
  let target = req
    .headers()
    .get(header::REFERER)
    .and_then(|v| v.to_str().ok())
    .and_then(|referer| local_path(referer, &host))
    .unwrap_or_else(|| fallback.to_string());
  redirect(&target)
}

fn local_path(referer: &str, host: &str) -> Option<String> {
  if referer.starts_with('/') && !referer.starts_with("//") {
    return Some(referer.to_string());
  }
  let rest = referer
    .strip_prefix("http://")
    .or_else(|| referer.strip_prefix("https://"))?;
  let path = rest.strip_prefix(host)?;
  match path {
    "" => Some("/".to_string()),
    p if p.starts_with('/') => Some(p.to_string()),
    _ => None,
  }
}
