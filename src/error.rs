//! Error types for the store, authentication, question generation, the quiz flow,
//! and the HTTP-facing `AppError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{GameState, Language};
use crate::i18n::strings;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("password hashing failed: {0}")]
    Kdf(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("name is required")]
    NameRequired,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("password is too short")]
    WeakPassword,
    #[error("auth/email-already-in-use")]
    EmailInUse,
    #[error("auth/invalid-credential")]
    InvalidCredential,
    #[error("user profile not found")]
    ProfileNotFound,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// Message shown to the user on the auth screen.
    pub fn user_message(&self, lang: Language) -> &'static str {
        let t = strings(lang);
        match self {
            AuthError::NameRequired => t.name_required,
            AuthError::InvalidEmail => t.invalid_email,
            AuthError::WeakPassword => t.weak_password,
            AuthError::EmailInUse => t.email_in_use,
            AuthError::InvalidCredential => t.invalid_credential,
            AuthError::ProfileNotFound => t.profile_not_found,
            AuthError::Storage(_) => t.storage_failure,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation API HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("generation response could not be parsed: {0}")]
    Parse(String),
    #[error("API returned an invalid or empty question list")]
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot {action} while on the {state} screen")]
    InvalidTransition { action: &'static str, state: GameState },
    #[error("select at least one topic")]
    NoTopicSelected,
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("option is not one of the current question's options: {0}")]
    UnknownOption(String),
    #[error("an option was already chosen for this question")]
    AlreadyAnswered,
    #[error("choose an option before moving on")]
    NoOptionSelected,
    #[error("questions are already being generated")]
    GenerationInProgress,
    #[error("a sign-in is already in progress")]
    AuthInProgress,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown session: {0}")]
    SessionNotFound(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorOut {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotSignedIn => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Flow(FlowError::InvalidTransition { .. })
            | AppError::Flow(FlowError::GenerationInProgress)
            | AppError::Flow(FlowError::AuthInProgress) => StatusCode::CONFLICT,
            AppError::Flow(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(target: "trivia_backend", error = %self, "request failed");
        }
        (status, Json(ErrorOut { error: self.to_string() })).into_response()
    }
}
