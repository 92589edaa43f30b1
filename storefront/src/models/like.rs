// storefront/src/models/like.rs

use serde::Serialize;

/// Outcome of flipping a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
  pub liked: bool,
}

impl LikeToggle {
  pub fn message(&self) -> &'static str {
    if self.liked {
      "Product liked"
    } else {
      "Product unliked"
    }
  }
}
