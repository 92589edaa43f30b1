// storefront/src/main.rs

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use storefront::{db, telemetry, web as routes, AppConfig, AppState};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  telemetry::init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting storefront server...");

  let db_pool = db::connect(&app_config).await.context("Failed to open the database")?;

  if app_config.seed_db {
    let seeded = db::seed(&db_pool).await.context("Failed to seed the database")?;
    tracing::info!(seeded, "Database seeding step finished.");
  }

  let server_address = app_config.bind_address();
  let app_state = AppState::new(db_pool, app_config).context("Failed to prepare application state")?;

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .app_data(routes::upload_config(&app_state))
      .wrap(from_fn(routes::session_middleware))
      .wrap(TracingLogger::default())
      .configure(routes::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
