// storefront/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One rejected form field, surfaced next to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Form validation failed: {}", describe_fields(.0))]
  Validation(Vec<FieldError>),

  #[error("{0} not found")]
  NotFound(String),

  #[error("Email is already registered!")]
  DuplicateEmail,

  #[error("Username is already taken!")]
  DuplicateUsername,

  #[error("Invalid username, email, or password")]
  InvalidCredentials,

  #[error("Invalid admin password!")]
  InvalidAdminSecret,

  #[error("Invalid category selected. Please select a valid category.")]
  InvalidCategory,

  #[error("Item not found in cart")]
  NotFoundInCart,

  #[error("Failed to delete product: {0} (probably someone has it in cart)")]
  ReferentialConflict(String),

  #[error("Please log in to access this page.")]
  Unauthenticated,

  #[error("Administrator access required.")]
  Forbidden,

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Database Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Storage Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

fn describe_fields(errors: &[FieldError]) -> String {
  errors
    .iter()
    .map(|e| format!("{}: {}", e.field, e.message))
    .collect::<Vec<_>>()
    .join("; ")
}

impl AppError {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    AppError::Validation(vec![FieldError::new(field, message)])
  }

  /// Domain outcomes a page handler reports back on the originating form
  /// instead of failing the request.
  pub fn is_user_facing(&self) -> bool {
    matches!(
      self,
      AppError::Validation(_)
        | AppError::NotFound(_)
        | AppError::DuplicateEmail
        | AppError::DuplicateUsername
        | AppError::InvalidCredentials
        | AppError::InvalidAdminSecret
        | AppError::InvalidCategory
        | AppError::NotFoundInCart
        | AppError::ReferentialConflict(_)
    )
  }

  pub fn field_errors(&self) -> &[FieldError] {
    match self {
      AppError::Validation(errors) => errors,
      _ => &[],
    }
  }
}

/// Classifies a constraint failure raised by the store, if it is one.
pub(crate) fn constraint_kind(err: &sqlx::Error) -> Option<sqlx::error::ErrorKind> {
  match err {
    sqlx::Error::Database(db_err) => match db_err.kind() {
      sqlx::error::ErrorKind::Other => None,
      kind => Some(kind),
    },
    _ => None,
  }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(constraint_kind(err), Some(sqlx::error::ErrorKind::UniqueViolation))
}

// SQLite reports RESTRICT actions as SQLITE_CONSTRAINT_TRIGGER, which sqlx leaves unclassified.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
  if matches!(constraint_kind(err), Some(sqlx::error::ErrorKind::ForeignKeyViolation)) {
    return true;
  }
  match err {
    sqlx::Error::Database(db_err) => {
      db_err.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER) && db_err.message().contains("FOREIGN KEY")
    }
    _ => false,
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::InvalidCategory => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) | AppError::NotFoundInCart => StatusCode::NOT_FOUND,
      AppError::DuplicateEmail | AppError::DuplicateUsername | AppError::ReferentialConflict(_) => StatusCode::CONFLICT,
      AppError::InvalidCredentials | AppError::InvalidAdminSecret => StatusCode::UNAUTHORIZED,
      // Page routes behave like a login_required guard.
      AppError::Unauthenticated => StatusCode::SEE_OTHER,
      AppError::Forbidden => StatusCode::FORBIDDEN,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Io(_)
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    match self {
      AppError::Unauthenticated => HttpResponse::build(status)
        .insert_header((header::LOCATION, "/login"))
        .finish(),
      AppError::Validation(errors) => HttpResponse::build(status).json(json!({
          "error": "Validation failed",
          "errors": errors,
      })),
      _ if status.is_server_error() => {
        // Log the full error; the client only learns that something broke.
        tracing::error!(application_error = %self, "Responding with internal error");
        HttpResponse::build(status).json(json!({"error": "An internal error occurred"}))
      }
      _ => HttpResponse::build(status).json(json!({"error": self.to_string()})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
