//! Trivia quiz backend.
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables question generation via OpenAI if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   QUIZ_CONFIG_PATH    : path to TOML config (prompts + catalog overrides)
//!   QUIZ_QUESTION_COUNT : questions per quiz (default 10)
//!   DATA_PATH           : JSON file for accounts and history (memory only if unset)
//!   STATIC_DIR          : SPA directory (default "./static")
//!   SESSION_TTL_SECS    : idle HTTP sessions are evicted after this (default 1800)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, warn};

use trivia_backend::routes::build_router;
use trivia_backend::state::{spawn_session_sweeper, AppState};
use trivia_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (sessions, store, catalog, OpenAI client).
  let state = Arc::new(AppState::from_env().await?);
  let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));

  spawn_session_sweeper(state.clone());
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "trivia_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "trivia_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!(target: "trivia_backend", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        warn!(target: "trivia_backend", error = %e, "Failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  info!(target: "trivia_backend", "Shutdown signal received");
}
