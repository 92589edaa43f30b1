// storefront/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod cart_item;
pub mod category;
pub mod like;
pub mod product;
pub mod user;

pub use cart_item::{CartItem, CartLine, CartView};
pub use category::Category;
pub use like::LikeToggle;
pub use product::{Product, RankedProduct};
pub use user::{Role, User};
