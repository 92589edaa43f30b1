// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Shortest accepted `SECRET_KEY`; the cookie signing key is derived from it.
pub const MIN_SECRET_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,

  pub secret_key: String,
  pub admin_secret: String,
  // Off by default: the shared secret only grants the admin role at registration.
  pub admin_secret_login: bool,

  pub upload_dir: PathBuf,
  pub session_max_age_secs: i64,

  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url)
      .field("db_max_connections", &self.db_max_connections)
      .field("secret_key", &"[REDACTED]")
      .field("admin_secret", &"[REDACTED]")
      .field("admin_secret_login", &self.admin_secret_login)
      .field("upload_dir", &self.upload_dir)
      .field("session_max_age_secs", &self.session_max_age_secs)
      .field("seed_db", &self.seed_db)
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` feeds it the process env.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
    let require = |name: &str| {
      lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = parse_var("SERVER_PORT", &get_or("SERVER_PORT", "8080"))?;
    let database_url = get_or("DATABASE_URL", "sqlite://storefront.db");
    let db_max_connections: u32 = parse_var("DB_MAX_CONNECTIONS", &get_or("DB_MAX_CONNECTIONS", "5"))?;
    if db_max_connections == 0 {
      return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    let secret_key = require("SECRET_KEY")?;
    if secret_key.len() < MIN_SECRET_KEY_LEN {
      return Err(AppError::Config(format!(
        "SECRET_KEY must be at least {} bytes long",
        MIN_SECRET_KEY_LEN
      )));
    }
    let admin_secret = require("ADMIN_SECRET")?;
    let admin_secret_login = parse_var("ADMIN_SECRET_LOGIN", &get_or("ADMIN_SECRET_LOGIN", "false"))?;

    let upload_dir = PathBuf::from(get_or("UPLOAD_DIR", "static/uploads"));
    let session_max_age_secs: i64 = parse_var("SESSION_MAX_AGE_SECS", &get_or("SESSION_MAX_AGE_SECS", "86400"))?;
    if session_max_age_secs <= 0 {
      return Err(AppError::Config("SESSION_MAX_AGE_SECS must be positive".to_string()));
    }

    let seed_db = parse_var("SEED_DB", &get_or("SEED_DB", "false"))?;
    let log_format = match get_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
      "text" => LogFormat::Text,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT value: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      secret_key,
      admin_secret,
      admin_secret_login,
      upload_dir,
      session_max_age_secs,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
}
