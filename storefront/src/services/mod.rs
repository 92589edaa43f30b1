// storefront/src/services/mod.rs

//! Component operations. Each takes an explicit [`RequestContext`](crate::context::RequestContext)
//! carrying the caller's identity and the shared state.

pub mod admin;
pub mod assets;
pub mod auth_service;
pub mod cart;
pub mod catalog;
pub mod identity;
pub mod likes;
