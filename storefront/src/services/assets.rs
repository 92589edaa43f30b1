// storefront/src/services/assets.rs

//! Managed storage for product images.
//!
//! Uploads are staged as temp files inside `<root>/.staging` and published
//! into `<root>` with a no-clobber hard link + unlink, so a reader of
//! `/static/<name>` never observes a half-written file and an existing image
//! is never overwritten.

use crate::errors::{AppError, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub const PUBLIC_PREFIX: &str = "/static";
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

const STAGING_DIR: &str = ".staging";
const MAX_PUBLISH_ATTEMPTS: usize = 5;

/// An uploaded file waiting to be published.
#[derive(Debug)]
pub struct ImageUpload {
  pub original_name: String,
  pub staged: NamedTempFile,
}

#[derive(Debug, Clone)]
pub struct AssetStore {
  root: PathBuf,
}

impl AssetStore {
  /// Opens (creating if needed) the asset directory and its staging area.
  pub fn open(root: impl AsRef<Path>) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    std::fs::create_dir_all(root.join(STAGING_DIR))?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn staging_dir(&self) -> PathBuf {
    self.root.join(STAGING_DIR)
  }

  /// Stages in-memory bytes the same way a multipart upload is staged.
  pub fn stage_bytes(&self, original_name: &str, bytes: &[u8]) -> Result<ImageUpload> {
    let mut staged = NamedTempFile::new_in(self.staging_dir())?;
    staged.write_all(bytes)?;
    staged.flush()?;
    Ok(ImageUpload {
      original_name: original_name.to_string(),
      staged,
    })
  }

  /// Moves a staged upload to its public location and returns the path to
  /// record on the product, e.g. `/static/goggles.jpg`.
  #[instrument(name = "assets::publish", skip(self, upload), fields(original_name = %upload.original_name))]
  pub async fn publish(&self, upload: ImageUpload) -> Result<String> {
    let root = self.root.clone();
    tokio::task::spawn_blocking(move || publish_blocking(&root, upload))
      .await
      .map_err(|e| AppError::Internal(format!("Upload publishing task failed: {}", e)))?
  }

  /// Best-effort removal of a file published by [`AssetStore::publish`].
  pub async fn discard(&self, public_path: &str) {
    let Some(name) = public_name(public_path) else {
      return;
    };
    if let Err(e) = tokio::fs::remove_file(self.root.join(name)).await {
      warn!(error = %e, path = %public_path, "Failed to discard published asset.");
    }
  }

  /// Reads a published asset together with its guessed content type.
  pub async fn read(&self, name: &str) -> Result<(Vec<u8>, mime_guess::Mime)> {
    if sanitize_filename(name).as_deref() != Some(name) {
      return Err(AppError::NotFound("Asset".to_string()));
    }
    let path = self.root.join(name);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok((bytes, mime_guess::from_path(&path).first_or_octet_stream())),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AppError::NotFound("Asset".to_string())),
      Err(e) => Err(e.into()),
    }
  }
}

fn publish_blocking(root: &Path, upload: ImageUpload) -> Result<String> {
  let base = check_image_name(&upload.original_name).map_err(|msg| AppError::validation("file", msg))?;

  let mut staged = upload.staged;
  let mut candidate = base.clone();
  for _ in 0..MAX_PUBLISH_ATTEMPTS {
    match staged.persist_noclobber(root.join(&candidate)) {
      Ok(_) => {
        debug!(name = %candidate, "Published asset.");
        return Ok(public_path(&candidate));
      }
      Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
        staged = err.file;
        candidate = with_random_suffix(&base);
      }
      Err(err) => return Err(AppError::Io(err.error)),
    }
  }
  Err(AppError::Internal(format!("No free file name found for upload '{}'", base)))
}

pub fn public_path(name: &str) -> String {
  format!("{}/{}", PUBLIC_PREFIX, name)
}

fn public_name(public_path: &str) -> Option<&str> {
  let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
  (sanitize_filename(name).as_deref() == Some(name)).then_some(name)
}

/// Reduces a client-supplied file name to a safe basename: path separators
/// and whitespace fold to `_`, anything outside `[A-Za-z0-9._-]` is dropped,
/// and leading/trailing dots and underscores are trimmed.
pub fn sanitize_filename(raw: &str) -> Option<String> {
  let spaced: String = raw
    .chars()
    .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
    .collect();
  let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
  let kept: String = joined
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    .collect();
  let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

/// Sanitizes an image name and checks its extension.
pub fn check_image_name(raw: &str) -> std::result::Result<String, &'static str> {
  let name = sanitize_filename(raw).ok_or("File name is not usable.")?;
  let extension = Path::new(&name)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();
  if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
    Ok(name)
  } else {
    Err("Unsupported image format. Use png, jpg, jpeg, gif or webp.")
  }
}

fn with_random_suffix(name: &str) -> String {
  let tag = Uuid::new_v4().simple().to_string();
  let tag = &tag[..8];
  match name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, tag, ext),
    _ => format!("{}-{}", name, tag),
  }
}
