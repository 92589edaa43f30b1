// storefront/src/db/mod.rs

//! SQLite persistence: pool setup, schema migrations, demo seeding, and the
//! per-table query modules.
//!
//! Query functions take any `SqliteExecutor`, so the same call works against
//! the pool or inside a transaction (`&mut *tx`).

pub mod cart;
pub mod categories;
pub mod likes;
pub mod products;
pub mod users;

use crate::config::AppConfig;
use crate::errors::Result;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[instrument(name = "db::connect", skip(config), fields(max_connections = config.db_max_connections))]
pub async fn connect(config: &AppConfig) -> Result<SqlitePool> {
  let options = SqliteConnectOptions::from_str(&config.database_url)?
    .create_if_missing(true)
    .foreign_keys(true)
    .journal_mode(SqliteJournalMode::Wal)
    .busy_timeout(BUSY_TIMEOUT);

  let pool = SqlitePoolOptions::new()
    .max_connections(config.db_max_connections)
    .connect_with(options)
    .await?;

  MIGRATOR.run(&pool).await?;
  info!("Database connected and migrations applied.");
  Ok(pool)
}

struct SeedCategory {
  name: &'static str,
  product_name: &'static str,
  price: i64,
  files: &'static [&'static str],
}

const SEED_CATALOG: &[SeedCategory] = &[
  SeedCategory {
    name: "Goggles",
    product_name: "MP XCEED",
    price: 100,
    files: &[
      "goggle1.jpg",
      "goggle2.jpg",
      "goggle3.jpg",
      "goggle4.jpg",
      "goggle5.jpg",
      "goggle6.jpg",
      "goggle7.jpg",
      "goggle8.jpg",
    ],
  },
  SeedCategory {
    name: "Caps",
    product_name: "MP cap",
    price: 50,
    files: &[
      "MPcap.jpg",
      "MPcap2.jpg",
      "MPcap3.jpg",
      "MPcap4.jpg",
      "MPcap5.jpg",
      "MPcap6.webp",
      "MPcap7.jpg",
    ],
  },
  SeedCategory {
    name: "Tech suits",
    product_name: "MP Tech suit",
    price: 200,
    files: &["MPsuit.jpg", "MPsuit2.webp", "MPsuit3.webp", "MPsuit4.png", "MPsuit5.jpg"],
  },
];

/// Fills an empty catalog with the demo categories and products.
/// Returns `false` without touching anything when categories already exist.
#[instrument(name = "db::seed", skip(pool))]
pub async fn seed(pool: &SqlitePool) -> Result<bool> {
  let mut tx = pool.begin().await?;

  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
    .fetch_one(&mut *tx)
    .await?;
  if existing > 0 {
    info!(existing, "Catalog already has categories; skipping seed.");
    return Ok(false);
  }

  let mut product_count = 0usize;
  for seed in SEED_CATALOG {
    let category = categories::insert(&mut *tx, seed.name).await?;
    for file in seed.files {
      products::insert(
        &mut *tx,
        seed.product_name,
        seed.price,
        &format!("/static/{}", file),
        Some(category.id),
      )
      .await?;
      product_count += 1;
    }
  }

  tx.commit().await?;
  info!(categories = SEED_CATALOG.len(), products = product_count, "Seeded demo catalog.");
  Ok(true)
}
