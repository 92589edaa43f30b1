// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::assets::AssetStore;
use crate::session::SessionStore;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: SqlitePool,
  pub config: Arc<AppConfig>, // Share loaded config
  pub sessions: SessionStore,
  pub assets: AssetStore,
}

impl AppState {
  pub fn new(db_pool: SqlitePool, config: AppConfig) -> Result<Self> {
    let sessions = SessionStore::new(config.secret_key.as_bytes(), config.session_max_age_secs);
    let assets = AssetStore::open(&config.upload_dir)?;
    Ok(Self {
      db_pool,
      config: Arc::new(config),
      sessions,
      assets,
    })
  }
}
