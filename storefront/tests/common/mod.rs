// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset of these helpers.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use storefront::config::AppConfig;
use storefront::context::RequestContext;
use storefront::db;
use storefront::models::{Category, Product, Role, User};
use storefront::services::auth_service;
use storefront::session::SessionUser;
use storefront::state::AppState;
use tempfile::TempDir;

pub const TEST_SECRET_KEY: &str = "test-secret-key-that-is-at-least-32-bytes";
pub const ADMIN_SECRET: &str = "pool-deck-admin";
pub const TEST_PASSWORD: &str = "butterfly-200m";

// Argon2 is slow in debug builds; hash the shared fixture password once.
static TEST_PASSWORD_HASH: Lazy<String> =
  Lazy::new(|| auth_service::hash_password(TEST_PASSWORD).expect("hashing the fixture password"));

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new("storefront=debug"))
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config(dir: &Path) -> AppConfig {
  let vars: HashMap<&str, String> = HashMap::from([
    ("SECRET_KEY", TEST_SECRET_KEY.to_string()),
    ("ADMIN_SECRET", ADMIN_SECRET.to_string()),
    ("DATABASE_URL", format!("sqlite://{}", dir.join("test.db").display())),
    ("UPLOAD_DIR", dir.join("uploads").display().to_string()),
  ]);
  AppConfig::from_lookup(|name| vars.get(name).cloned()).expect("valid test config")
}

/// A throwaway database and upload directory, removed when dropped.
pub struct TestEnv {
  pub dir: TempDir,
  pub state: AppState,
}

impl TestEnv {
  pub async fn new() -> Self {
    Self::with_config(|_| {}).await
  }

  pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
    setup_tracing();
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(dir.path());
    adjust(&mut config);
    let pool = db::connect(&config).await.expect("database");
    let state = AppState::new(pool, config).expect("app state");
    Self { dir, state }
  }

  pub fn anonymous(&self) -> RequestContext {
    RequestContext::anonymous(self.state.clone())
  }

  pub fn as_user(&self, user: &User) -> RequestContext {
    RequestContext::for_user(self.state.clone(), SessionUser::from(user))
  }

  pub fn upload_dir(&self) -> &Path {
    self.state.assets.root()
  }

  /// Inserts a user whose password is [`TEST_PASSWORD`].
  pub async fn user(&self, username: &str) -> User {
    self.insert_user(username, Role::User).await
  }

  pub async fn admin(&self, username: &str) -> User {
    self.insert_user(username, Role::Admin).await
  }

  async fn insert_user(&self, username: &str, role: Role) -> User {
    let email = format!("{}@example.com", username);
    db::users::insert(&self.state.db_pool, username, &email, &TEST_PASSWORD_HASH, role)
      .await
      .expect("insert user")
  }

  pub async fn category(&self, name: &str) -> Category {
    db::categories::insert(&self.state.db_pool, name).await.expect("insert category")
  }

  pub async fn product(&self, name: &str, price: i64, category_id: Option<i64>) -> Product {
    let file = format!("/static/{}.jpg", name.to_lowercase().replace(' ', "_"));
    db::products::insert(&self.state.db_pool, name, price, &file, category_id)
      .await
      .expect("insert product")
  }

  pub async fn like(&self, user: &User, product: &Product) {
    db::likes::insert_if_absent(&self.state.db_pool, user.id, product.id)
      .await
      .expect("insert like");
  }

  pub async fn put_in_cart(&self, user: &User, product: &Product) {
    db::cart::add_one(&self.state.db_pool, user.id, product.id)
      .await
      .expect("add to cart");
  }

  pub async fn count(&self, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
      .fetch_one(&self.state.db_pool)
      .await
      .expect("count rows")
  }

  /// Rows of `table` matching `column = value`.
  pub async fn count_where(&self, table: &str, column: &str, value: i64) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, column))
      .bind(value)
      .fetch_one(&self.state.db_pool)
      .await
      .expect("count rows")
  }

  /// Whether `user` has a row for `product` in `table` (cart or likes).
  pub async fn has_row(&self, table: &str, user: &User, product: &Product) -> bool {
    sqlx::query_scalar(&format!(
      "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = ? AND product_id = ?)",
      table
    ))
    .bind(user.id)
    .bind(product.id)
    .fetch_one(&self.state.db_pool)
    .await
    .expect("lookup row")
  }

  /// Published files in the upload directory (the staging area excluded).
  pub fn published_files(&self) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
      .expect("read upload dir")
      .filter_map(|entry| entry.ok())
      .filter(|entry| entry.path().is_file())
      .map(|entry| entry.file_name().to_string_lossy().into_owned())
      .collect();
    names.sort();
    names
  }
}

/// Builds the full application around `$state` the way `main.rs` does,
/// minus the request logger.
#[macro_export]
macro_rules! storefront_app {
  ($state:expr) => {{
    let state: storefront::state::AppState = $state;
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new(state.clone()))
        .app_data(storefront::web::upload_config(&state))
        .wrap(actix_web::middleware::from_fn(storefront::web::session_middleware))
        .configure(storefront::web::configure_app_routes),
    )
    .await
  }};
}
