// storefront/src/services/identity.rs

//! Registration and login.

use crate::context::RequestContext;
use crate::db;
use crate::errors::{is_unique_violation, AppError, FieldError, Result};
use crate::models::{Role, User};
use crate::services::auth_service;
use serde::Deserialize;
use tracing::{info, instrument, warn};

pub const MAX_USERNAME_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 40;

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
  #[serde(default = "default_role")]
  pub role: String,
}

fn default_role() -> String {
  Role::User.as_str().to_string()
}

/// A registration that passed form validation.
#[derive(Debug)]
struct ValidRegistration<'a> {
  username: &'a str,
  email: &'a str,
  password: &'a str,
  role: Role,
}

impl Registration {
  fn validate(&self) -> Result<ValidRegistration<'_>> {
    let mut errors = Vec::new();

    let username = self.username.trim();
    if username.is_empty() {
      errors.push(FieldError::new("username", "Username is required."));
    } else if username.chars().count() > MAX_USERNAME_LEN {
      errors.push(FieldError::new(
        "username",
        format!("Username must be at most {} characters.", MAX_USERNAME_LEN),
      ));
    }

    let email = self.email.trim();
    if email.is_empty() {
      errors.push(FieldError::new("email", "Email is required."));
    } else if !looks_like_email(email) {
      errors.push(FieldError::new("email", "Invalid email address."));
    } else if email.chars().count() > MAX_EMAIL_LEN {
      errors.push(FieldError::new(
        "email",
        format!("Email must be at most {} characters.", MAX_EMAIL_LEN),
      ));
    }

    if self.password.is_empty() {
      errors.push(FieldError::new("password", "Password is required."));
    }

    let role = match self.role.parse::<Role>() {
      Ok(role) => Some(role),
      Err(_) => {
        errors.push(FieldError::new("role", "Role must be either user or admin."));
        None
      }
    };

    match role {
      Some(role) if errors.is_empty() => Ok(ValidRegistration {
        username,
        email,
        password: &self.password,
        role,
      }),
      _ => Err(AppError::Validation(errors)),
    }
  }
}

/// Login form: `username` may hold either a username or an email address;
/// `email` is accepted as a fallback identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub password: String,
}

impl Credentials {
  pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username: identifier.into(),
      email: String::new(),
      password: password.into(),
    }
  }

  fn identifier(&self) -> &str {
    match self.username.trim() {
      "" => self.email.trim(),
      username => username,
    }
  }

  fn validate(&self) -> Result<()> {
    let mut errors = Vec::new();
    if self.identifier().is_empty() {
      errors.push(FieldError::new("username", "Username or email is required."));
    }
    if self.password.is_empty() {
      errors.push(FieldError::new("password", "Password is required."));
    }
    if errors.is_empty() {
      Ok(())
    } else {
      Err(AppError::Validation(errors))
    }
  }
}

/// Minimal shape check: one `@` with a non-empty local part and a dotted domain.
fn looks_like_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain
          .split_once('.')
          .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
    }
    None => false,
  }
}

/// Creates an account. The admin role is only granted when the submitted
/// password equals the configured admin secret; the caller logs the new user
/// in on success.
#[instrument(name = "identity::register", skip(ctx, form), fields(username = %form.username, role = %form.role), err(Display))]
pub async fn register(ctx: &RequestContext, form: &Registration) -> Result<User> {
  let valid = form.validate()?;

  if db::users::email_exists(ctx.db(), valid.email).await? {
    warn!("Registration with an already registered email.");
    return Err(AppError::DuplicateEmail);
  }
  if valid.role == Role::Admin && valid.password != ctx.config().admin_secret {
    warn!("Admin registration with a wrong admin secret.");
    return Err(AppError::InvalidAdminSecret);
  }
  if db::users::username_exists(ctx.db(), valid.username).await? {
    return Err(AppError::DuplicateUsername);
  }

  let password_hash = auth_service::hash_password(valid.password)?;
  let user = db::users::insert(ctx.db(), valid.username, valid.email, &password_hash, valid.role)
    .await
    .map_err(|e| {
      // Lost a race with a concurrent registration.
      if is_unique_violation(&e) {
        if e.to_string().contains("email") {
          AppError::DuplicateEmail
        } else {
          AppError::DuplicateUsername
        }
      } else {
        AppError::Sqlx(e)
      }
    })?;

  info!(user_id = user.id, "User registered.");
  Ok(user)
}

/// Authenticates by username or email. Every failure is the same
/// `InvalidCredentials` so callers cannot probe which part was wrong.
#[instrument(name = "identity::login", skip(ctx, credentials), fields(identifier = %credentials.identifier()), err(Display))]
pub async fn login(ctx: &RequestContext, credentials: &Credentials) -> Result<User> {
  credentials.validate()?;

  let Some(user) = db::users::find_by_login(ctx.db(), credentials.identifier()).await? else {
    return Err(AppError::InvalidCredentials);
  };

  let config = ctx.config();
  if config.admin_secret_login && credentials.password == config.admin_secret {
    if user.is_admin() {
      info!(user_id = user.id, "Admin logged in with the shared secret.");
      return Ok(user);
    }
    return Err(AppError::InvalidCredentials);
  }

  if auth_service::verify_password(&user.password_hash, &credentials.password)? {
    info!(user_id = user.id, "User logged in.");
    Ok(user)
  } else {
    Err(AppError::InvalidCredentials)
  }
}
