// storefront/src/lib.rs

//! A small storefront: accounts with an admin role, a categorized catalog,
//! carts, likes, and admin product management, served over actix-web with a
//! SQLite store.

pub mod config;
pub mod context;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod web;

pub use config::AppConfig;
pub use context::RequestContext;
pub use errors::{AppError, Result};
pub use state::AppState;
