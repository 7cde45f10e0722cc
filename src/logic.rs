//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Applying a client action to a session's quiz flow
//!   - Calling the account store for sign-up/sign-in and saving results
//!   - Calling the question generator between difficulty selection and the quiz
//!   - Building the session view

use tracing::{error, info, instrument, warn};

use crate::domain::{GameState, Language, User};
use crate::error::{AppError, AuthError};
use crate::i18n::strings;
use crate::protocol::{build_view, ClientAction, SessionView};
use crate::quiz::CompletedQuiz;
use crate::state::AppState;

/// Current view of a session, including the dashboard history when on that screen.
#[instrument(level = "debug", skip(state))]
pub async fn session_view(state: &AppState, session_id: &str) -> Result<SessionView, AppError> {
  let flow = state.session(session_id).await?;
  let history = match (&flow.user, flow.state) {
    (Some(user), GameState::Dashboard) => state.store.results_for_user(&user.id).await,
    _ => Vec::new(),
  };
  Ok(build_view(session_id, &flow, &state.catalog, history))
}

/// Apply one action. Flow errors (out-of-order or invalid input) are returned;
/// auth and generation failures are shown to the user through the view's `error`.
#[instrument(level = "info", skip(state, action), fields(action = action.name()))]
pub async fn apply_action(state: &AppState, session_id: &str, action: ClientAction) -> Result<(), AppError> {
  match action {
    ClientAction::SelectLanguage { language } => {
      state.with_session(session_id, |f| f.select_language(language)).await??;
    }

    ClientAction::SignUp { name, email, password } => {
      // Claimed under the session lock so a concurrent auth on this session is refused.
      let lang = state.with_session(session_id, |f| f.begin_auth("sign_up")).await??;
      let outcome = state.store.sign_up(&name, &email, &password).await;
      finish_auth(state, session_id, lang, outcome).await?;
    }

    ClientAction::SignIn { email, password } => {
      let lang = state.with_session(session_id, |f| f.begin_auth("sign_in")).await??;
      let outcome = match state.store.sign_in(&email, &password).await {
        // Credentials and profile are separate lookups; the profile is what the session keeps.
        Ok(user) => state.store.profile(&user.id).await.ok_or(AuthError::ProfileNotFound),
        Err(e) => Err(e),
      };
      finish_auth(state, session_id, lang, outcome).await?;
    }

    ClientAction::SignOut => {
      state.with_session(session_id, |f| f.sign_out()).await??;
      info!(target: "quiz", %session_id, "Signed out");
    }

    ClientAction::StartNewQuiz => state.with_session(session_id, |f| f.start_new_quiz()).await??,

    ClientAction::ToggleTopic { topic } => {
      let catalog = &state.catalog;
      state.with_session(session_id, |f| f.toggle_topic(catalog, &topic)).await??;
    }

    ClientAction::ConfirmCategories { topics } => {
      let catalog = &state.catalog;
      state.with_session(session_id, |f| f.confirm_categories(catalog, topics)).await??;
    }

    ClientAction::BackToCategories => state.with_session(session_id, |f| f.back_to_categories()).await??,

    ClientAction::BackToDashboard => state.with_session(session_id, |f| f.back_to_dashboard()).await??,

    ClientAction::SelectDifficulty { difficulty } => {
      let catalog = &state.catalog;
      let count = state.settings.question_count;
      let req = state
        .with_session(session_id, |f| f.begin_generation(catalog, &difficulty, count))
        .await??;

      // No lock is held while the generator runs.
      let generated = state.generate_questions(&req).await;
      let message = strings(req.language).generation_failed;
      let applied = state
        .with_session(session_id, |f| match generated {
          Ok(questions) => {
            info!(target: "quiz", %session_id, count = questions.len(), "Quiz ready");
            f.questions_ready(questions)
          }
          Err(e) => {
            error!(target: "quiz", %session_id, error = %e, "Question generation failed");
            f.generation_failed(message)
          }
        })
        .await?;
      if let Err(e) = applied {
        // The session left the loading phase while we were generating; drop the result.
        warn!(target: "quiz", %session_id, error = %e, "Generation result discarded");
      }
    }

    ClientAction::SelectOption { option } => {
      state.with_session(session_id, |f| f.select_option(&option)).await??;
    }

    ClientAction::NextQuestion => {
      let done = state.with_session(session_id, |f| f.next_question()).await??;
      record_completion(state, session_id, done).await?;
    }

    ClientAction::SkipQuestion => {
      let done = state.with_session(session_id, |f| f.skip_question()).await??;
      record_completion(state, session_id, done).await?;
    }

    ClientAction::PlayAgain => state.with_session(session_id, |f| f.play_again()).await??,

    ClientAction::Retry => state.with_session(session_id, |f| f.retry()).await??,
  }
  Ok(())
}

async fn finish_auth(
  state: &AppState,
  session_id: &str,
  lang: Language,
  outcome: Result<User, AuthError>,
) -> Result<(), AppError> {
  match outcome {
    Ok(user) => {
      info!(target: "quiz", %session_id, user_id = %user.id, "Signed in");
      state.with_session(session_id, |f| f.signed_in(user)).await??;
    }
    Err(e) => {
      warn!(target: "quiz", %session_id, error = %e, "Authentication failed");
      let message = e.user_message(lang);
      state.with_session(session_id, |f| f.auth_failed(message)).await??;
    }
  }
  Ok(())
}

/// Persist a finished quiz and attach the stored record to the session.
async fn record_completion(state: &AppState, session_id: &str, done: Option<CompletedQuiz>) -> Result<(), AppError> {
  let Some(done) = done else { return Ok(()) };
  let flow = state.session(session_id).await?;
  let Some(user) = flow.user else {
    warn!(target: "quiz", %session_id, "Quiz finished without a signed-in user; result not saved");
    return Ok(());
  };

  info!(target: "quiz", %session_id, score = done.score, total = done.total, percentage = done.percentage, "Quiz completed");
  match state.store.save_result(done.into_new_result(&user.id)).await {
    Ok(saved) => {
      state.with_session(session_id, |f| f.attach_result(saved)).await?;
    }
    Err(e) => {
      error!(target: "quiz", %session_id, error = %e, "Failed to save quiz result");
      let message = strings(flow.language).storage_failure;
      state.with_session(session_id, |f| f.error = Some(message.to_string())).await?;
    }
  }
  Ok(())
}

/// Loading text for a `select_difficulty` that is about to start generating, if it would be accepted.
pub async fn loading_notice(state: &AppState, session_id: &str, difficulty: &str) -> Option<(String, String)> {
  let flow = state.session(session_id).await.ok()?;
  let acceptable = flow.state == GameState::DifficultySelection
    && !flow.loading
    && state.catalog.contains_difficulty(flow.language, difficulty);
  if !acceptable {
    return None;
  }
  let t = strings(flow.language);
  Some((t.loading_message(difficulty, &t.topics_label(&flow.selected_topics)), t.loading_submessage.to_string()))
}
