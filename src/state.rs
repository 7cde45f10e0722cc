//! Application state: quiz sessions, the account store, catalog, prompts, and the question generator.
//!
//! This module owns:
//!   - per-client quiz sessions (by id)
//!   - the account/history store (memory or JSON-file backed)
//!   - the catalog and prompts (from TOML or defaults)
//!   - optional OpenAI client
//!
//! Question selection generates a fresh quiz via OpenAI when available.
//! Without an API key we serve the built-in bank, preferring the chosen topics.
//! HTTP sessions idle longer than `SESSION_TTL_SECS` are swept in the background.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{sync::RwLock, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{load_quiz_config_from_env, Prompts, QuizConfig, Settings};
use crate::domain::Question;
use crate::error::{AppError, GenerationError, StoreError};
use crate::openai::OpenAI;
use crate::quiz::{GenerationRequest, QuizFlow};
use crate::seeds::pick_offline;
use crate::store::Store;

/// A session's flow plus what the idle sweeper needs to know about it.
pub struct SessionSlot {
    pub flow: QuizFlow,
    last_seen: Instant,
    /// Owned by a live WebSocket; removed on disconnect, never swept.
    connection_bound: bool,
}

impl SessionSlot {
    fn new(connection_bound: bool) -> Self {
        Self { flow: QuizFlow::new(), last_seen: Instant::now(), connection_bound }
    }
}

pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SessionSlot>>>,
    pub store: Store,
    pub catalog: Catalog,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub settings: Settings,
}

impl AppState {
    /// Build state from env: settings, TOML config, the store snapshot, and OpenAI.
    #[instrument(level = "info", skip_all)]
    pub async fn from_env() -> Result<Self, StoreError> {
        let settings = Settings::from_env();
        let cfg = load_quiz_config_from_env();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "trivia_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "trivia_backend", "OpenAI disabled (no OPENAI_API_KEY). Serving the built-in question bank.");
        }

        Self::build(settings, cfg, openai).await
    }

    pub async fn build(
        settings: Settings,
        cfg: Option<QuizConfig>,
        openai: Option<OpenAI>,
    ) -> Result<Self, StoreError> {
        let cfg = cfg.unwrap_or_default();
        let store = match &settings.data_path {
            Some(path) => Store::open(path).await?,
            None => {
                warn!(target: "trivia_backend", "DATA_PATH not set; accounts and history are kept in memory only");
                Store::in_memory()
            }
        };
        info!(
            target: "trivia_backend",
            question_count = settings.question_count,
            session_ttl_secs = settings.session_ttl.as_secs(),
            "Quiz settings"
        );

        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            store,
            catalog: Catalog::with_overrides(&cfg.catalogs),
            openai,
            prompts: cfg.prompts,
            settings,
        })
    }

    /// Register an HTTP session on the language screen and return its id.
    /// It is swept after `session_ttl` without requests.
    pub async fn create_session(&self) -> String {
        self.insert_session(false).await
    }

    /// Register a session owned by a WebSocket connection.
    pub async fn create_connection_session(&self) -> String {
        self.insert_session(true).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn insert_session(&self, connection_bound: bool) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(id.clone(), SessionSlot::new(connection_bound));
        info!(target: "quiz", session_id = %id, "Session created");
        id
    }

    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "quiz", session_id = %id, "Session removed");
        }
        removed
    }

    /// Snapshot of a session's flow. Counts as activity.
    pub async fn session(&self, id: &str) -> Result<QuizFlow, AppError> {
        self.with_session(id, |f| f.clone()).await
    }

    /// Run `f` against a session's flow under the write lock.
    pub async fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut QuizFlow) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        slot.last_seen = Instant::now();
        Ok(f(&mut slot.flow))
    }

    /// Drop HTTP sessions idle for longer than `session_ttl`. Returns how many went.
    pub async fn evict_idle_sessions(&self) -> usize {
        let ttl = self.settings.session_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, slot| {
            let keep = slot.connection_bound || slot.last_seen.elapsed() < ttl;
            if !keep {
                debug!(target: "quiz", session_id = %id, "Idle session evicted");
            }
            keep
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(target: "quiz", evicted, remaining = sessions.len(), "Swept idle sessions");
        }
        evicted
    }

    /// Produce questions for a request: OpenAI when configured, otherwise the built-in bank.
    #[instrument(level = "info", skip(self, req), fields(difficulty = %req.difficulty, language = req.language.code()))]
    pub async fn generate_questions(&self, req: &GenerationRequest) -> Result<Vec<Question>, GenerationError> {
        if let Some(oa) = &self.openai {
            return oa.generate_questions(&self.prompts, req).await;
        }

        let bank = pick_offline(req.language, &req.topics, &req.difficulty, req.count, &mut rand::thread_rng());
        if bank.is_empty() {
            return Err(GenerationError::Empty);
        }
        warn!(target: "quiz", served = bank.len(), "Serving offline question bank");
        Ok(bank)
    }
}

/// How often the sweeper wakes for a given TTL.
fn sweep_period(ttl: Duration) -> Duration {
    (ttl / 4).clamp(Duration::from_millis(50), Duration::from_secs(60))
}

/// Periodically evict idle HTTP sessions for as long as the process runs.
pub fn spawn_session_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let period = sweep_period(state.settings.session_ttl);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            state.evict_idle_sessions().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn state_with_ttl(ttl: Duration) -> AppState {
        let settings = Settings { session_ttl: ttl, ..Settings::default() };
        AppState::build(settings, None, None).await.unwrap()
    }

    #[tokio::test]
    async fn idle_http_sessions_are_evicted() {
        let state = state_with_ttl(Duration::from_millis(30)).await;
        let idle = state.create_session().await;
        let socket = state.create_connection_session().await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        let fresh = state.create_session().await;

        assert_eq!(state.evict_idle_sessions().await, 1);
        assert!(matches!(state.session(&idle).await, Err(AppError::SessionNotFound(_))));
        assert!(state.session(&socket).await.is_ok());
        assert!(state.session(&fresh).await.is_ok());
    }

    #[tokio::test]
    async fn activity_keeps_a_session_alive() {
        let state = state_with_ttl(Duration::from_millis(80)).await;
        let id = state.create_session().await;
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(30)).await;
            state.session(&id).await.unwrap();
        }
        assert_eq!(state.evict_idle_sessions().await, 0);
    }

    #[test]
    fn sweep_period_is_bounded() {
        assert_eq!(sweep_period(Duration::from_millis(20)), Duration::from_millis(50));
        assert_eq!(sweep_period(Duration::from_secs(40)), Duration::from_secs(10));
        assert_eq!(sweep_period(Duration::from_secs(3600)), Duration::from_secs(60));
    }
}
