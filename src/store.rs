//! Account and history store: user profiles, credentials, and quiz results.
//!
//! Data lives in memory behind a `RwLock` and, when a path is configured, is
//! mirrored to a JSON snapshot that is rewritten (temp file + rename) after
//! every mutation and loaded again at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use argon2::Argon2;
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{NewQuizResult, QuizResult, User};
use crate::error::{AuthError, StoreError};
use crate::util::looks_like_email;

pub const MIN_PASSWORD_LEN: usize = 6;
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct UserRecord {
  profile: User,
  salt: String,
  password_digest: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
  #[serde(default)]
  users: HashMap<String, UserRecord>,
  #[serde(default)]
  results: Vec<QuizResult>,
}

pub struct Store {
  data: RwLock<StoreData>,
  path: Option<PathBuf>,
}

impl Store {
  pub fn in_memory() -> Self {
    Self { data: RwLock::new(StoreData::default()), path: None }
  }

  /// Open a file-backed store. A missing file starts empty; a corrupt one is an error.
  #[instrument(level = "info", skip_all, fields(path = %path.display()))]
  pub async fn open(path: &Path) -> Result<Self, StoreError> {
    let data = match tokio::fs::read(path).await {
      Ok(bytes) => serde_json::from_slice::<StoreData>(&bytes)?,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        info!(target: "trivia_backend", "No store snapshot yet; starting empty");
        StoreData::default()
      }
      Err(e) => return Err(e.into()),
    };
    info!(target: "trivia_backend", users = data.users.len(), results = data.results.len(), "Store loaded");
    Ok(Self { data: RwLock::new(data), path: Some(path.to_path_buf()) })
  }

  async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
    let Some(path) = &self.path else { return Ok(()) };
    let bytes = serde_json::to_vec_pretty(data)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!(target: "trivia_backend", bytes = bytes.len(), "Store snapshot written");
    Ok(())
  }

  #[instrument(level = "info", skip(self, password), fields(email = %email))]
  pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(AuthError::NameRequired);
    }
    let email = normalize_email(email);
    if !looks_like_email(&email) {
      return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(AuthError::WeakPassword);
    }

    // Hash outside the write lock.
    let salt = new_salt();
    let password_digest = digest_password(salt.clone(), password.to_string()).await?;

    let mut data = self.data.write().await;
    if data.users.values().any(|u| u.profile.email == email) {
      return Err(AuthError::EmailInUse);
    }

    let user = User { id: Uuid::new_v4().to_string(), name: name.to_string(), email };
    let record = UserRecord { profile: user.clone(), salt, password_digest };
    data.users.insert(user.id.clone(), record);
    if let Err(e) = self.persist(&data).await {
      data.users.remove(&user.id);
      return Err(e.into());
    }
    info!(target: "trivia_backend", user_id = %user.id, "User signed up");
    Ok(user)
  }

  #[instrument(level = "info", skip(self, password), fields(email = %email))]
  pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
    let email = normalize_email(email);
    let record = {
      let data = self.data.read().await;
      data.users.values().find(|u| u.profile.email == email).cloned()
    };
    let record = record.ok_or(AuthError::InvalidCredential)?;
    let candidate = digest_password(record.salt.clone(), password.to_string()).await?;
    let matches: bool = candidate.as_bytes().ct_eq(record.password_digest.as_bytes()).into();
    if !matches {
      warn!(target: "trivia_backend", "Sign-in rejected");
      return Err(AuthError::InvalidCredential);
    }
    Ok(record.profile)
  }

  pub async fn profile(&self, user_id: &str) -> Option<User> {
    self.data.read().await.users.get(user_id).map(|r| r.profile.clone())
  }

  #[instrument(level = "info", skip(self, new), fields(user_id = %new.user_id, score = new.score, total = new.total))]
  pub async fn save_result(&self, new: NewQuizResult) -> Result<QuizResult, StoreError> {
    let result = QuizResult {
      id: Uuid::new_v4().to_string(),
      user_id: new.user_id,
      date: Utc::now(),
      topics: new.topics,
      difficulty: new.difficulty,
      score: new.score.min(new.total),
      total: new.total,
      score_percentage: new.score_percentage,
    };
    let mut data = self.data.write().await;
    data.results.push(result.clone());
    if let Err(e) = self.persist(&data).await {
      data.results.pop();
      return Err(e);
    }
    Ok(result)
  }

  /// A user's results, newest first.
  pub async fn results_for_user(&self, user_id: &str) -> Vec<QuizResult> {
    let data = self.data.read().await;
    let mut out: Vec<QuizResult> = data.results.iter().filter(|r| r.user_id == user_id).cloned().collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
  }
}

fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn new_salt() -> String {
  let mut bytes = [0u8; SALT_LEN];
  rand::thread_rng().fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Argon2id (crate default cost) over the password, salted; hex encoded.
async fn digest_password(salt: String, password: String) -> Result<String, StoreError> {
  tokio::task::spawn_blocking(move || {
    let mut out = [0u8; DIGEST_LEN];
    Argon2::default()
      .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut out)
      .map_err(|e| StoreError::Kdf(e.to_string()))?;
    Ok(hex::encode(out))
  })
  .await
  .map_err(|e| StoreError::Kdf(e.to_string()))?
}
