//! The per-session quiz flow: a linear screen state machine.
//!
//! language → auth → dashboard → category → difficulty → quiz → results
//!
//! The flow is synchronous. Collaborators that need I/O (the account store and
//! the question generator) are called by `logic` between steps: the flow hands
//! out a `GenerationRequest` and later accepts `questions_ready` or
//! `generation_failed`; finishing the last question yields a `CompletedQuiz`
//! for the caller to persist.

use crate::catalog::Catalog;
use crate::domain::{GameState, Language, NewQuizResult, Question, QuizResult, User, SKIPPED};
use crate::error::FlowError;
use crate::scoring;

/// What the generator needs to produce a quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
  pub topics: Vec<String>,
  pub difficulty: String,
  pub language: Language,
  pub count: usize,
}

/// Summary of a finished quiz, ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedQuiz {
  pub topics: Vec<String>,
  pub difficulty: String,
  pub score: u32,
  pub total: u32,
  pub percentage: u32,
}

impl CompletedQuiz {
  pub fn into_new_result(self, user_id: &str) -> NewQuizResult {
    NewQuizResult {
      user_id: user_id.to_string(),
      topics: self.topics,
      difficulty: self.difficulty,
      score: self.score,
      total: self.total,
      score_percentage: self.percentage,
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct QuizFlow {
  pub state: GameState,
  pub language: Language,
  pub user: Option<User>,
  pub selected_topics: Vec<String>,
  pub difficulty: Option<String>,
  pub questions: Vec<Question>,
  pub current_index: usize,
  pub selected_option: Option<String>,
  pub answers: Vec<String>,
  /// Message shown to the user (auth or generation failure).
  pub error: Option<String>,
  pub loading: bool,
  /// A sign-up or sign-in is waiting on the account store.
  pub authenticating: bool,
  pub last_result: Option<QuizResult>,
}

impl QuizFlow {
  pub fn new() -> Self {
    Self::default()
  }

  /// Refuse anything while an async collaborator is working for this session.
  fn ensure_idle(&self) -> Result<(), FlowError> {
    if self.loading {
      return Err(FlowError::GenerationInProgress);
    }
    if self.authenticating {
      return Err(FlowError::AuthInProgress);
    }
    Ok(())
  }

  fn guard(&self, action: &'static str, allowed: &[GameState]) -> Result<(), FlowError> {
    self.ensure_idle()?;
    if allowed.contains(&self.state) {
      Ok(())
    } else {
      Err(FlowError::InvalidTransition { action, state: self.state })
    }
  }

  fn reset_quiz(&mut self) {
    self.selected_topics.clear();
    self.difficulty = None;
    self.questions.clear();
    self.current_index = 0;
    self.selected_option = None;
    self.answers.clear();
    self.error = None;
    self.loading = false;
  }

  pub fn select_language(&mut self, lang: Language) -> Result<(), FlowError> {
    self.guard("select_language", &[GameState::LanguageSelection])?;
    self.language = lang;
    self.state = if self.user.is_some() { GameState::Dashboard } else { GameState::Auth };
    Ok(())
  }

  /// Sign-up or sign-in succeeded.
  /// Claim the auth screen for one sign-up or sign-in. Held until
  /// `signed_in` or `auth_failed`.
  pub fn begin_auth(&mut self, action: &'static str) -> Result<Language, FlowError> {
    self.guard(action, &[GameState::Auth])?;
    self.authenticating = true;
    Ok(self.language)
  }

  fn end_auth(&mut self, action: &'static str) -> Result<(), FlowError> {
    if !self.authenticating || self.state != GameState::Auth {
      return Err(FlowError::InvalidTransition { action, state: self.state });
    }
    self.authenticating = false;
    Ok(())
  }

  pub fn signed_in(&mut self, user: User) -> Result<(), FlowError> {
    self.end_auth("signed_in")?;
    self.user = Some(user);
    self.error = None;
    self.state = GameState::Dashboard;
    Ok(())
  }

  /// Sign-up or sign-in was rejected; stay on the auth screen and show why.
  pub fn auth_failed(&mut self, message: impl Into<String>) -> Result<(), FlowError> {
    self.end_auth("auth_failed")?;
    self.error = Some(message.into());
    Ok(())
  }

  pub fn sign_out(&mut self) -> Result<(), FlowError> {
    self.guard("sign_out", &[GameState::Dashboard])?;
    self.reset_quiz();
    self.user = None;
    self.last_result = None;
    self.state = GameState::Auth;
    Ok(())
  }

  pub fn start_new_quiz(&mut self) -> Result<(), FlowError> {
    self.guard("start_new_quiz", &[GameState::Dashboard])?;
    self.reset_quiz();
    self.state = GameState::CategorySelection;
    Ok(())
  }

  pub fn toggle_topic(&mut self, catalog: &Catalog, topic: &str) -> Result<(), FlowError> {
    self.guard("toggle_topic", &[GameState::CategorySelection])?;
    if let Some(pos) = self.selected_topics.iter().position(|t| t == topic) {
      self.selected_topics.remove(pos);
      return Ok(());
    }
    if !catalog.contains_topic(self.language, topic) {
      return Err(FlowError::UnknownTopic(topic.to_string()));
    }
    self.selected_topics.push(topic.to_string());
    Ok(())
  }

  /// Confirm the current selection, or replace it with `topics` first when given.
  pub fn confirm_categories(&mut self, catalog: &Catalog, topics: Option<Vec<String>>) -> Result<(), FlowError> {
    self.guard("confirm_categories", &[GameState::CategorySelection])?;
    if let Some(topics) = topics {
      let mut picked: Vec<String> = Vec::with_capacity(topics.len());
      for t in topics {
        if !catalog.contains_topic(self.language, &t) {
          return Err(FlowError::UnknownTopic(t));
        }
        if !picked.contains(&t) {
          picked.push(t);
        }
      }
      self.selected_topics = picked;
    }
    if self.selected_topics.is_empty() {
      return Err(FlowError::NoTopicSelected);
    }
    self.state = GameState::DifficultySelection;
    Ok(())
  }

  pub fn back_to_categories(&mut self) -> Result<(), FlowError> {
    self.guard("back_to_categories", &[GameState::DifficultySelection])?;
    self.error = None;
    self.state = GameState::CategorySelection;
    Ok(())
  }

  pub fn back_to_dashboard(&mut self) -> Result<(), FlowError> {
    self.guard("back_to_dashboard", &[GameState::CategorySelection, GameState::Results])?;
    self.reset_quiz();
    self.state = GameState::Dashboard;
    Ok(())
  }

  /// Pick a difficulty and enter the loading phase.
  pub fn begin_generation(
    &mut self,
    catalog: &Catalog,
    difficulty: &str,
    count: usize,
  ) -> Result<GenerationRequest, FlowError> {
    self.guard("select_difficulty", &[GameState::DifficultySelection])?;
    if !catalog.contains_difficulty(self.language, difficulty) {
      return Err(FlowError::UnknownDifficulty(difficulty.to_string()));
    }
    self.difficulty = Some(difficulty.to_string());
    self.error = None;
    self.loading = true;
    Ok(GenerationRequest {
      topics: self.selected_topics.clone(),
      difficulty: difficulty.to_string(),
      language: self.language,
      count,
    })
  }

  pub fn questions_ready(&mut self, questions: Vec<Question>) -> Result<(), FlowError> {
    if !self.loading || self.state != GameState::DifficultySelection {
      return Err(FlowError::InvalidTransition { action: "questions_ready", state: self.state });
    }
    self.loading = false;
    self.questions = questions;
    self.current_index = 0;
    self.selected_option = None;
    self.answers.clear();
    self.state = GameState::Quiz;
    Ok(())
  }

  pub fn generation_failed(&mut self, message: impl Into<String>) -> Result<(), FlowError> {
    if !self.loading || self.state != GameState::DifficultySelection {
      return Err(FlowError::InvalidTransition { action: "generation_failed", state: self.state });
    }
    self.loading = false;
    self.error = Some(message.into());
    Ok(())
  }

  /// Dismiss a displayed error and start over from category selection.
  pub fn retry(&mut self) -> Result<(), FlowError> {
    self.ensure_idle()?;
    if self.error.is_none() || self.user.is_none() {
      return Err(FlowError::InvalidTransition { action: "retry", state: self.state });
    }
    self.reset_quiz();
    self.state = GameState::CategorySelection;
    Ok(())
  }

  pub fn current_question(&self) -> Option<&Question> {
    if self.state == GameState::Quiz {
      self.questions.get(self.current_index)
    } else {
      None
    }
  }

  pub fn is_last_question(&self) -> bool {
    self.current_index + 1 >= self.questions.len()
  }

  /// Share of the quiz already behind the user, 0..=100.
  pub fn progress_percent(&self) -> u32 {
    if self.questions.is_empty() {
      return 0;
    }
    (self.current_index * 100 / self.questions.len()) as u32
  }

  pub fn select_option(&mut self, option: &str) -> Result<(), FlowError> {
    self.guard("select_option", &[GameState::Quiz])?;
    if self.selected_option.is_some() {
      return Err(FlowError::AlreadyAnswered);
    }
    let known = self
      .current_question()
      .map(|q| q.options.iter().any(|o| o == option))
      .unwrap_or(false);
    if !known {
      return Err(FlowError::UnknownOption(option.to_string()));
    }
    self.selected_option = Some(option.to_string());
    Ok(())
  }

  pub fn next_question(&mut self) -> Result<Option<CompletedQuiz>, FlowError> {
    self.guard("next_question", &[GameState::Quiz])?;
    let answer = self.selected_option.take().ok_or(FlowError::NoOptionSelected)?;
    Ok(self.record_answer(answer))
  }

  pub fn skip_question(&mut self) -> Result<Option<CompletedQuiz>, FlowError> {
    self.guard("skip_question", &[GameState::Quiz])?;
    self.selected_option = None;
    Ok(self.record_answer(SKIPPED.to_string()))
  }

  fn record_answer(&mut self, answer: String) -> Option<CompletedQuiz> {
    self.answers.push(answer);
    if self.is_last_question() {
      self.state = GameState::Results;
      Some(self.completed())
    } else {
      self.current_index += 1;
      None
    }
  }

  fn completed(&self) -> CompletedQuiz {
    let total = self.questions.len() as u32;
    let score = scoring::score(&self.questions, &self.answers);
    CompletedQuiz {
      topics: self.selected_topics.clone(),
      difficulty: self.difficulty.clone().unwrap_or_default(),
      score,
      total,
      percentage: scoring::percentage(score, total),
    }
  }

  /// Remember the stored record of the quiz just finished.
  pub fn attach_result(&mut self, result: QuizResult) {
    self.last_result = Some(result);
  }

  pub fn play_again(&mut self) -> Result<(), FlowError> {
    self.guard("play_again", &[GameState::Results])?;
    self.reset_quiz();
    self.state = GameState::CategorySelection;
    Ok(())
  }
}
