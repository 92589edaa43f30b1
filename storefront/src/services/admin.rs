// storefront/src/services/admin.rs

//! Admin catalog management: create, edit and delete products.
//!
//! `/addproduct` and `/uploadfile` both land in [`create_product`]; only the
//! redirect after success differs between them.

use crate::context::RequestContext;
use crate::db;
use crate::errors::{is_foreign_key_violation, AppError, FieldError, Result};
use crate::models::Product;
use crate::services::assets::{check_image_name, ImageUpload};
use serde::Deserialize;
use tracing::{info, instrument, warn};

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 100;

/// Raw text fields of the product form, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub price: String,
  #[serde(default)]
  pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProduct {
  pub name: String,
  pub price: i64,
  pub category_id: i64,
}

impl ProductForm {
  pub fn new(name: impl Into<String>, price: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      price: price.into(),
      category: category.into(),
    }
  }

  /// Checks every field (and the upload, if any) and reports all problems at once.
  pub fn validate(&self, upload: Option<&ImageUpload>, file_required: bool) -> Result<ValidatedProduct> {
    let mut errors = Vec::new();

    let name = self.name.trim();
    let name_len = name.chars().count();
    if name_len == 0 {
      errors.push(FieldError::new("name", "Product name is required."));
    } else if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name_len) {
      errors.push(FieldError::new(
        "name",
        format!("Product name must be between {} and {} characters.", MIN_NAME_LEN, MAX_NAME_LEN),
      ));
    }

    let price = match self.price.trim() {
      "" => {
        errors.push(FieldError::new("price", "Price is required."));
        None
      }
      raw => match raw.parse::<i64>() {
        Ok(p) if p >= 0 => Some(p),
        Ok(_) => {
          errors.push(FieldError::new("price", "Price cannot be negative."));
          None
        }
        Err(_) => {
          errors.push(FieldError::new("price", "Price must be a whole number."));
          None
        }
      },
    };

    let category_id = match self.category.trim() {
      "" => {
        errors.push(FieldError::new("category", "Category is required."));
        None
      }
      raw => match raw.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
          errors.push(FieldError::new("category", "Not a valid choice."));
          None
        }
      },
    };

    match upload {
      Some(upload) => {
        if let Err(msg) = check_image_name(&upload.original_name) {
          errors.push(FieldError::new("file", msg));
        }
      }
      None if file_required => errors.push(FieldError::new("file", "A product image is required.")),
      None => {}
    }

    match (price, category_id) {
      (Some(price), Some(category_id)) if errors.is_empty() => Ok(ValidatedProduct {
        name: name.to_string(),
        price,
        category_id,
      }),
      _ => Err(AppError::Validation(errors)),
    }
  }
}

async fn ensure_category(ctx: &RequestContext, category_id: i64) -> Result<()> {
  match db::categories::find_by_id(ctx.db(), category_id).await? {
    Some(_) => Ok(()),
    None => Err(AppError::InvalidCategory),
  }
}

/// Validates the form, publishes the image and inserts the product.
/// The published image is removed again if the insert fails.
#[instrument(name = "admin::create_product", skip(ctx, form, upload), fields(name = %form.name), err(Display))]
pub async fn create_product(ctx: &RequestContext, form: &ProductForm, upload: Option<ImageUpload>) -> Result<Product> {
  ctx.require_admin()?;

  let valid = form.validate(upload.as_ref(), true)?;
  let upload = upload.ok_or_else(|| AppError::validation("file", "A product image is required."))?;
  ensure_category(ctx, valid.category_id).await?;

  let file = ctx.assets().publish(upload).await?;
  match db::products::insert(ctx.db(), &valid.name, valid.price, &file, Some(valid.category_id)).await {
    Ok(product) => {
      info!(product_id = product.id, file = %product.file, "Product created.");
      Ok(product)
    }
    Err(e) => {
      ctx.assets().discard(&file).await;
      if is_foreign_key_violation(&e) {
        Err(AppError::InvalidCategory)
      } else {
        Err(AppError::Sqlx(e))
      }
    }
  }
}

/// Rewrites name, price and category; swaps the image only when a new one
/// is uploaded. The previous image file is left on disk.
#[instrument(name = "admin::edit_product", skip(ctx, form, upload), err(Display))]
pub async fn edit_product(
  ctx: &RequestContext,
  product_id: i64,
  form: &ProductForm,
  upload: Option<ImageUpload>,
) -> Result<Product> {
  ctx.require_admin()?;

  if db::products::find_by_id(ctx.db(), product_id).await?.is_none() {
    return Err(AppError::NotFound("Product".to_string()));
  }
  let valid = form.validate(upload.as_ref(), false)?;
  ensure_category(ctx, valid.category_id).await?;

  let new_file = match upload {
    Some(upload) => Some(ctx.assets().publish(upload).await?),
    None => None,
  };

  let updated = db::products::update(
    ctx.db(),
    product_id,
    &valid.name,
    valid.price,
    Some(valid.category_id),
    new_file.as_deref(),
  )
  .await;

  let outcome = match updated {
    Ok(Some(product)) => Ok(product),
    // Deleted concurrently.
    Ok(None) => Err(AppError::NotFound("Product".to_string())),
    Err(e) if is_foreign_key_violation(&e) => Err(AppError::InvalidCategory),
    Err(e) => Err(AppError::Sqlx(e)),
  };

  match outcome {
    Ok(product) => {
      info!(product_id, image_replaced = new_file.is_some(), "Product updated.");
      Ok(product)
    }
    Err(e) => {
      if let Some(file) = &new_file {
        ctx.assets().discard(file).await;
      }
      Err(e)
    }
  }
}

/// Deletes a product in its own transaction. A cart row pointing at the
/// product blocks the delete and everything is rolled back; likes go with it.
#[instrument(name = "admin::delete_product", skip(ctx), err(Display))]
pub async fn delete_product(ctx: &RequestContext, product_id: i64) -> Result<()> {
  ctx.require_admin()?;

  let mut tx = ctx.db().begin().await?;
  match db::products::delete(&mut *tx, product_id).await {
    Ok(0) => {
      tx.rollback().await?;
      Err(AppError::NotFound("Product".to_string()))
    }
    Ok(_) => {
      tx.commit().await?;
      info!(product_id, "Product deleted.");
      Ok(())
    }
    Err(e) if is_foreign_key_violation(&e) => {
      tx.rollback().await?;
      warn!(product_id, error = %e, "Product delete blocked by cart rows.");
      Err(AppError::ReferentialConflict(e.to_string()))
    }
    Err(e) => {
      tx.rollback().await?;
      Err(AppError::Sqlx(e))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields(err: AppError) -> Vec<&'static str> {
    err.field_errors().iter().map(|e| e.field).collect()
  }

  #[test]
  fn valid_form_without_required_file() {
    let valid = ProductForm::new(" MP cap ", "50", "2").validate(None, false).unwrap();
    assert_eq!(
      valid,
      ValidatedProduct {
        name: "MP cap".to_string(),
        price: 50,
        category_id: 2,
      }
    );
  }

  #[test]
  fn every_bad_field_is_reported() {
    let err = ProductForm::new("x", "cheap", "").validate(None, true).unwrap_err();
    assert_eq!(fields(err), vec!["name", "price", "category", "file"]);
  }

  #[test]
  fn negative_price_and_long_name_are_rejected() {
    let err = ProductForm::new("n".repeat(MAX_NAME_LEN + 1), "-1", "1")
      .validate(None, false)
      .unwrap_err();
    assert_eq!(fields(err), vec!["name", "price"]);
  }
}
