// storefront/src/context.rs

//! The explicit per-request context every component operation receives:
//! who is calling (if anyone) and a handle to shared state.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::assets::AssetStore;
use crate::session::SessionUser;
use crate::state::AppState;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct RequestContext {
  pub app_state: AppState,
  pub user: Option<SessionUser>,
}

impl RequestContext {
  pub fn new(app_state: AppState, user: Option<SessionUser>) -> Self {
    Self { app_state, user }
  }

  pub fn anonymous(app_state: AppState) -> Self {
    Self::new(app_state, None)
  }

  pub fn for_user(app_state: AppState, user: SessionUser) -> Self {
    Self::new(app_state, Some(user))
  }

  pub fn db(&self) -> &SqlitePool {
    &self.app_state.db_pool
  }

  pub fn config(&self) -> &AppConfig {
    &self.app_state.config
  }

  pub fn assets(&self) -> &AssetStore {
    &self.app_state.assets
  }

  pub fn require_user(&self) -> Result<&SessionUser> {
    self.user.as_ref().ok_or(AppError::Unauthenticated)
  }

  pub fn require_admin(&self) -> Result<&SessionUser> {
    let user = self.require_user()?;
    if user.is_admin() {
      Ok(user)
    } else {
      Err(AppError::Forbidden)
    }
  }
}
