// storefront/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod render;
pub mod routes;

use crate::state::AppState;
use actix_multipart::form::tempfile::TempFileConfig;

pub use extractors::{AdminUser, CurrentUser};
pub use middleware::session_middleware;
pub use routes::configure_app_routes;

/// Multipart temp files are written next to the published images so that
/// publishing one is a rename within a single filesystem.
pub fn upload_config(state: &AppState) -> TempFileConfig {
  TempFileConfig::default().directory(state.assets.staging_dir())
}
