// storefront/src/web/handlers/admin_handlers.rs

//! Product management pages. Every handler here requires an admin session.

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::context::RequestContext;
use crate::errors::AppError;
use crate::models::Product;
use crate::services::admin::{self, ProductForm};
use crate::services::assets::ImageUpload;
use crate::services::catalog;
use crate::session::{FlashCategory, Session};
use crate::web::extractors::AdminUser;
use crate::web::render;

const ADD_TEMPLATE: &str = "addproduct.html";
const EDIT_TEMPLATE: &str = "editproduct.html";

/// Multipart body shared by the create and edit forms.
#[derive(Debug, MultipartForm)]
pub struct ProductUploadForm {
  pub name: Option<Text<String>>,
  pub price: Option<Text<String>>,
  pub category: Option<Text<String>>,
  #[multipart(limit = "20MB")]
  pub file: Option<TempFile>,
}

impl ProductUploadForm {
  fn into_parts(self) -> (ProductForm, Option<ImageUpload>) {
    let text = |field: Option<Text<String>>| field.map(Text::into_inner).unwrap_or_default();
    let form = ProductForm::new(text(self.name), text(self.price), text(self.category));
    // Browsers send an empty, nameless part when no file was picked.
    let upload = self.file.and_then(|file| match file.file_name {
      Some(name) if !name.is_empty() => Some(ImageUpload {
        original_name: name,
        staged: file.file,
      }),
      _ => None,
    });
    (form, upload)
  }
}

/// Where a successful create sends the admin.
#[derive(Debug, Clone, Copy)]
enum CreateEntry {
  AddProduct,
  UploadFile,
}

impl CreateEntry {
  fn success_location(self) -> &'static str {
    match self {
      CreateEntry::AddProduct => "/shop",
      CreateEntry::UploadFile => "/",
    }
  }

  fn form_location(self) -> &'static str {
    match self {
      CreateEntry::AddProduct => "/addproduct",
      CreateEntry::UploadFile => "/uploadfile",
    }
  }
}

fn form_echo(form: &ProductForm) -> Value {
  json!({ "name": form.name, "price": form.price, "category": form.category })
}

async fn add_form_page(ctx: &RequestContext, session: &Session) -> Result<HttpResponse, AppError> {
  let categories = catalog::list_categories(ctx).await?;
  Ok(render::page(session, ADD_TEMPLATE, json!({ "categories": categories, "form": {} })))
}

async fn create(
  entry: CreateEntry,
  ctx: RequestContext,
  session: Session,
  payload: ProductUploadForm,
) -> Result<HttpResponse, AppError> {
  let (form, upload) = payload.into_parts();
  match admin::create_product(&ctx, &form, upload).await {
    Ok(product) => {
      info!(product_id = product.id, ?entry, "Product added through the admin form.");
      session.flash(FlashCategory::Success, "You successfully added the product");
      Ok(render::redirect(entry.success_location()))
    }
    Err(AppError::InvalidCategory) => {
      session.flash(FlashCategory::Danger, AppError::InvalidCategory.to_string());
      Ok(render::redirect(entry.form_location()))
    }
    Err(AppError::Validation(errors)) => {
      for error in &errors {
        session.flash(FlashCategory::Danger, format!("Error in {}: {}", error.field, error.message));
      }
      let categories = catalog::list_categories(&ctx).await?;
      Ok(render::form_page(
        &session,
        StatusCode::BAD_REQUEST,
        ADD_TEMPLATE,
        &errors,
        json!({ "categories": categories, "form": form_echo(&form) }),
      ))
    }
    Err(err) => Err(err),
  }
}

pub async fn add_product_form_handler(_admin: AdminUser, ctx: RequestContext, session: Session) -> Result<HttpResponse, AppError> {
  add_form_page(&ctx, &session).await
}

#[instrument(name = "handler::add_product", skip_all)]
pub async fn add_product_handler(
  _admin: AdminUser,
  ctx: RequestContext,
  session: Session,
  payload: MultipartForm<ProductUploadForm>,
) -> Result<HttpResponse, AppError> {
  create(CreateEntry::AddProduct, ctx, session, payload.into_inner()).await
}

pub async fn upload_file_form_handler(_admin: AdminUser, ctx: RequestContext, session: Session) -> Result<HttpResponse, AppError> {
  add_form_page(&ctx, &session).await
}

#[instrument(name = "handler::upload_file", skip_all)]
pub async fn upload_file_handler(
  _admin: AdminUser,
  ctx: RequestContext,
  session: Session,
  payload: MultipartForm<ProductUploadForm>,
) -> Result<HttpResponse, AppError> {
  create(CreateEntry::UploadFile, ctx, session, payload.into_inner()).await
}

fn edit_context(product: &Product, categories: &[crate::models::Category], form: Value) -> Value {
  json!({ "product": product, "categories": categories, "form": form })
}

#[instrument(name = "handler::edit_product_form", skip(_admin, ctx, session), fields(product_id = %path.as_ref()))]
pub async fn edit_product_form_handler(
  _admin: AdminUser,
  ctx: RequestContext,
  session: Session,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product = catalog::get_product(&ctx, path.into_inner()).await?;
  let categories = catalog::list_categories(&ctx).await?;
  let form = json!({
    "name": product.name,
    "price": product.price.to_string(),
    "category": product.category_id.map(|id| id.to_string()),
  });
  Ok(render::page(&session, EDIT_TEMPLATE, edit_context(&product, &categories, form)))
}

#[instrument(name = "handler::edit_product", skip(_admin, ctx, session, payload), fields(product_id = %path.as_ref()))]
pub async fn edit_product_handler(
  _admin: AdminUser,
  ctx: RequestContext,
  session: Session,
  path: web::Path<i64>,
  payload: MultipartForm<ProductUploadForm>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let (form, upload) = payload.into_inner().into_parts();

  match admin::edit_product(&ctx, product_id, &form, upload).await {
    Ok(_) => {
      session.flash(FlashCategory::Success, "Product successfully updated");
      Ok(render::redirect("/shop"))
    }
    Err(err @ (AppError::Validation(_) | AppError::InvalidCategory)) => {
      for error in err.field_errors() {
        session.flash(FlashCategory::Danger, format!("Error in {}: {}", error.field, error.message));
      }
      let product = catalog::get_product(&ctx, product_id).await?;
      let categories = catalog::list_categories(&ctx).await?;
      render::form_failure(&session, err, EDIT_TEMPLATE, edit_context(&product, &categories, form_echo(&form)))
    }
    Err(err) => Err(err),
  }
}

/// Missing products answer 404; a product still in someone's cart answers 409
/// with the store's diagnostic and stays in the catalog.
#[instrument(name = "handler::delete_product", skip(_admin, ctx, session), fields(product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  _admin: AdminUser,
  ctx: RequestContext,
  session: Session,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  admin::delete_product(&ctx, path.into_inner()).await?;
  session.flash(FlashCategory::Success, "Product deleted");
  Ok(render::redirect("/shop"))
}
