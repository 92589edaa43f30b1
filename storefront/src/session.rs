// storefront/src/session.rs

//! Server-side sessions keyed by a signed cookie.
//!
//! The cookie only carries an opaque random id; who is logged in and which
//! flash messages are pending live in the in-process [`SessionStore`].
//! A session is only stored once something is written to it, and its id is
//! replaced whenever a user logs in.

use crate::models::{Role, User};
use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "storefront_session";

/// Minimum spacing between two sweeps of expired sessions.
const SWEEP_INTERVAL_SECS: i64 = 60;

/// Snapshot of the authenticated user kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
  pub id: i64,
  pub username: String,
  pub role: Role,
}

impl SessionUser {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

impl From<&User> for SessionUser {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      username: user.username.clone(),
      role: user.role,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
  Success,
  Danger,
  Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
  pub category: FlashCategory,
  pub message: String,
}

#[derive(Debug, Clone)]
struct SessionData {
  user: Option<SessionUser>,
  flashes: Vec<Flash>,
  created_at: i64,
}

#[derive(Clone)]
pub struct SessionStore {
  sessions: Arc<RwLock<HashMap<String, SessionData>>>,
  key: Key,
  max_age_secs: i64,
  last_sweep: Arc<AtomicI64>,
}

impl SessionStore {
  /// `secret` must be at least 32 bytes; `AppConfig` enforces this.
  pub fn new(secret: &[u8], max_age_secs: i64) -> Self {
    Self {
      sessions: Arc::new(RwLock::new(HashMap::new())),
      key: Key::derive_from(secret),
      max_age_secs,
      last_sweep: Arc::new(AtomicI64::new(chrono::Utc::now().timestamp())),
    }
  }

  /// Mints a fresh anonymous session.
  pub fn create(&self) -> String {
    self.insert_new(Vec::new())
  }

  /// Replaces `old` with a fresh id, carrying its pending flashes over.
  pub fn rotate(&self, old: Option<&str>) -> String {
    let flashes = old
      .and_then(|id| self.sessions.write().remove(id))
      .map(|data| data.flashes)
      .unwrap_or_default();
    self.insert_new(flashes)
  }

  fn insert_new(&self, flashes: Vec<Flash>) -> String {
    self.sweep_if_due();

    let session_id = Uuid::new_v4().to_string();
    let data = SessionData {
      user: None,
      flashes,
      created_at: chrono::Utc::now().timestamp(),
    };
    self.sessions.write().insert(session_id.clone(), data);
    session_id
  }

  /// Runs [`SessionStore::cleanup_expired`] at most once per sweep interval.
  fn sweep_if_due(&self) {
    let now = chrono::Utc::now().timestamp();
    let last = self.last_sweep.load(Ordering::Relaxed);
    if now - last < SWEEP_INTERVAL_SECS {
      return;
    }
    if self
      .last_sweep
      .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
      .is_ok()
    {
      self.cleanup_expired();
    }
  }

  pub fn contains(&self, session_id: &str) -> bool {
    let cutoff = self.cutoff();
    self
      .sessions
      .read()
      .get(session_id)
      .is_some_and(|data| data.created_at > cutoff)
  }

  pub fn user(&self, session_id: &str) -> Option<SessionUser> {
    self.sessions.read().get(session_id).and_then(|data| data.user.clone())
  }

  pub fn set_user(&self, session_id: &str, user: Option<SessionUser>) {
    if let Some(data) = self.sessions.write().get_mut(session_id) {
      data.user = user;
    }
  }

  pub fn push_flash(&self, session_id: &str, flash: Flash) {
    if let Some(data) = self.sessions.write().get_mut(session_id) {
      data.flashes.push(flash);
    }
  }

  /// Flash messages are read-once.
  pub fn take_flashes(&self, session_id: &str) -> Vec<Flash> {
    self
      .sessions
      .write()
      .get_mut(session_id)
      .map(|data| std::mem::take(&mut data.flashes))
      .unwrap_or_default()
  }

  pub fn cleanup_expired(&self) {
    let cutoff = self.cutoff();
    self.sessions.write().retain(|_, data| data.created_at > cutoff);
  }

  pub fn len(&self) -> usize {
    self.sessions.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Builds the signed cookie that carries `session_id`.
  pub fn signed_cookie(&self, session_id: &str) -> Option<Cookie<'static>> {
    let cookie = Cookie::build(SESSION_COOKIE, session_id.to_owned())
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .finish();

    let mut jar = CookieJar::new();
    jar.signed_mut(&self.key).add(cookie);
    jar.get(SESSION_COOKIE).cloned()
  }

  /// Returns the session id if the cookie's signature checks out.
  pub fn verify_cookie(&self, cookie: Cookie<'static>) -> Option<String> {
    let mut jar = CookieJar::new();
    jar.add_original(cookie);
    jar
      .signed(&self.key)
      .get(SESSION_COOKIE)
      .map(|verified| verified.value().to_owned())
  }

  fn cutoff(&self) -> i64 {
    chrono::Utc::now().timestamp() - self.max_age_secs
  }
}

#[derive(Debug, Default)]
struct SessionHandle {
  id: Option<String>,
  issue_cookie: bool,
}

/// The current request's session; installed by the session middleware.
///
/// Requests without a valid cookie start without a stored session. The first
/// write (a flash or a login) stores one and marks its cookie for the response.
#[derive(Clone)]
pub struct Session {
  store: SessionStore,
  handle: Arc<Mutex<SessionHandle>>,
}

impl Session {
  pub fn new(id: Option<String>, store: SessionStore) -> Self {
    Self {
      store,
      handle: Arc::new(Mutex::new(SessionHandle {
        id,
        issue_cookie: false,
      })),
    }
  }

  pub fn id(&self) -> Option<String> {
    self.handle.lock().id.clone()
  }

  pub fn user(&self) -> Option<SessionUser> {
    self.id().and_then(|id| self.store.user(&id))
  }

  /// Stores the user under a fresh session id, so an id handed out before
  /// authentication is never promoted.
  pub fn login(&self, user: SessionUser) {
    let mut handle = self.handle.lock();
    let session_id = self.store.rotate(handle.id.as_deref());
    self.store.set_user(&session_id, Some(user));
    handle.id = Some(session_id);
    handle.issue_cookie = true;
  }

  /// Forgets the authenticated user; calling it again is a no-op.
  pub fn logout(&self) {
    if let Some(id) = self.id() {
      self.store.set_user(&id, None);
    }
  }

  pub fn flash(&self, category: FlashCategory, message: impl Into<String>) {
    let id = self.ensure_stored();
    self.store.push_flash(
      &id,
      Flash {
        category,
        message: message.into(),
      },
    );
  }

  pub fn take_flashes(&self) -> Vec<Flash> {
    match self.id() {
      Some(id) => self.store.take_flashes(&id),
      None => Vec::new(),
    }
  }

  /// The cookie the response must carry, if this request stored a new session.
  pub fn pending_cookie(&self) -> Option<Cookie<'static>> {
    let handle = self.handle.lock();
    match (&handle.id, handle.issue_cookie) {
      (Some(id), true) => self.store.signed_cookie(id),
      _ => None,
    }
  }

  fn ensure_stored(&self) -> String {
    let mut handle = self.handle.lock();
    if let Some(id) = &handle.id {
      return id.clone();
    }
    let id = self.store.create();
    handle.id = Some(id.clone());
    handle.issue_cookie = true;
    id
  }
}
