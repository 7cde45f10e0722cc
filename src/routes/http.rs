//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::Language;
use crate::error::AppError;
use crate::logic::{apply_action, session_view};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let generator = if state.openai.is_some() { "openai" } else { "offline" };
  Json(HealthOut { ok: true, generator })
}

#[instrument(level = "info")]
pub async fn http_languages() -> impl IntoResponse {
  Json(languages())
}

#[instrument(level = "info", skip(state))]
pub async fn http_catalog(
  State(state): State<Arc<AppState>>,
  Query(q): Query<CatalogQuery>,
) -> Result<Json<CatalogOut>, AppError> {
  let language = match q.language.as_deref() {
    None => Language::default(),
    Some(code) => Language::from_code(code)
      .ok_or_else(|| AppError::BadRequest(format!("unsupported language: {code}")))?,
  };
  let entry = state.catalog.for_language(language);
  Ok(Json(CatalogOut {
    language,
    categories: entry.categories.clone(),
    difficulties: entry.difficulties.clone(),
  }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
  let id = state.create_session().await;
  let view = session_view(&state, &id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
  Ok(Json(session_view(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
  if state.remove_session(&id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(AppError::SessionNotFound(id))
  }
}

#[instrument(level = "info", skip(state, action), fields(action = action.name()))]
pub async fn http_post_action(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(action): Json<ClientAction>,
) -> Result<Json<SessionView>, AppError> {
  apply_action(&state, &id, action).await?;
  let view = session_view(&state, &id).await?;
  info!(target: "quiz", session_id = %id, screen = view.screen_name(), "HTTP action applied");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_history(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<HistoryOut>, AppError> {
  let flow = state.session(&id).await?;
  let user = flow.user.ok_or(AppError::NotSignedIn)?;
  let results = state.store.results_for_user(&user.id).await;
  Ok(Json(HistoryOut { results: history_entries(flow.language, results) }))
}
