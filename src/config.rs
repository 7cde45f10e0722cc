//! Runtime settings (environment) and quiz configuration (prompts + catalog overrides) from TOML.
//!
//! See `QuizConfig`, `Prompts` and `Settings` for the expected schema.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::{Category, Language};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_QUESTION_COUNT: usize = 10;
const MAX_QUESTION_COUNT: usize = 50;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub catalogs: Vec<CatalogCfg>,
}

/// Catalog override for one language. Empty lists keep the built-in defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogCfg {
  pub language: Language,
  #[serde(default)] pub categories: Vec<Category>,
  #[serde(default)] pub difficulties: Vec<String>,
}

/// Prompts used by the question generator.
/// Placeholders: `{count}`, `{language}`, `{topics}`, `{difficulty}`.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub questions_system: String,
  pub questions_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      questions_system: "You are a trivia quiz author. Respond ONLY with strict JSON.".into(),
      questions_user_template: "Generate {count} unique and challenging multiple-choice questions in {language}. \
The questions should cover the following topics: \"{topics}\". \
The majority of the questions MUST be related to the MENA (Middle East and North Africa) region. \
The difficulty level should be \"{difficulty}\". Each question must have exactly 4 options. \
Ensure the correct answer is one of the provided options. \
Return a JSON object {\"questions\": [{\"question\": string, \"options\": [string, string, string, string], \"correctAnswer\": string}]}. \
All values must be written in {language}."
        .into(),
    }
  }
}

/// Process-level settings read from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
  pub port: u16,
  pub question_count: usize,
  /// JSON snapshot of users and results; memory-only when unset.
  pub data_path: Option<PathBuf>,
  pub static_dir: PathBuf,
  /// HTTP sessions without a request for this long are evicted.
  pub session_ttl: Duration,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      question_count: DEFAULT_QUESTION_COUNT,
      data_path: None,
      static_dir: PathBuf::from("./static"),
      session_ttl: DEFAULT_SESSION_TTL,
    }
  }
}

impl Settings {
  pub fn from_env() -> Self {
    let default = Self::default();
    let question_count = std::env::var("QUIZ_QUESTION_COUNT")
      .ok()
      .and_then(|v| v.parse::<usize>().ok())
      .map(clamp_question_count)
      .unwrap_or(default.question_count);
    Self {
      port: std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(default.port),
      question_count,
      data_path: std::env::var("DATA_PATH").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from),
      static_dir: std::env::var("STATIC_DIR").map(PathBuf::from).unwrap_or(default.static_dir),
      session_ttl: parse_session_ttl(std::env::var("SESSION_TTL_SECS").ok().as_deref()),
    }
  }
}

fn clamp_question_count(n: usize) -> usize {
  if n == 0 || n > MAX_QUESTION_COUNT {
    warn!(target: "trivia_backend", requested = n, "QUIZ_QUESTION_COUNT out of range; using default");
    DEFAULT_QUESTION_COUNT
  } else {
    n
  }
}

fn parse_session_ttl(raw: Option<&str>) -> Duration {
  match raw.map(|v| v.trim().parse::<u64>()) {
    None => DEFAULT_SESSION_TTL,
    Some(Ok(secs)) if secs > 0 => Duration::from_secs(secs),
    Some(_) => {
      warn!(target: "trivia_backend", "SESSION_TTL_SECS must be a positive number of seconds; using default");
      DEFAULT_SESSION_TTL
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  load_quiz_config(Path::new(&path))
}

pub fn load_quiz_config(path: &Path) -> Option<QuizConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "trivia_backend", path = %path.display(), catalogs = cfg.catalogs.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "trivia_backend", path = %path.display(), error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "trivia_backend", path = %path.display(), error = %e, "Failed to read TOML config file");
      None
    }
  }
}
