//! Domain models: languages, users, questions, results and the screen states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of options every multiple-choice question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Answer recorded when the user moves past a question without choosing.
pub const SKIPPED: &str = "SKIPPED";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  En,
  Ar,
}

impl Language {
  pub const ALL: [Language; 2] = [Language::En, Language::Ar];

  pub fn from_code(code: &str) -> Option<Self> {
    match code.trim().to_ascii_lowercase().as_str() {
      "en" => Some(Language::En),
      "ar" => Some(Language::Ar),
      _ => None,
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Language::En => "en",
      Language::Ar => "ar",
    }
  }

  /// Name of the language written in itself (what the picker shows).
  pub fn native_name(self) -> &'static str {
    match self {
      Language::En => "English",
      Language::Ar => "العربية",
    }
  }

  /// English name, used when instructing the model.
  pub fn english_name(self) -> &'static str {
    match self {
      Language::En => "English",
      Language::Ar => "Arabic",
    }
  }

  /// Text direction of the document for this language.
  pub fn dir(self) -> &'static str {
    match self {
      Language::En => "ltr",
      Language::Ar => "rtl",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
  pub id: String,
  pub name: String,
  pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
  pub name: String,
  pub subcategories: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: String,
}

impl Question {
  /// Non-empty text, exactly four non-empty options, and the correct answer among them.
  pub fn is_well_formed(&self) -> bool {
    !self.question.trim().is_empty()
      && self.options.len() == OPTIONS_PER_QUESTION
      && self.options.iter().all(|o| !o.trim().is_empty())
      && self.options.iter().any(|o| o == &self.correct_answer)
  }
}

/// A finished quiz as persisted in the history store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
  pub id: String,
  pub user_id: String,
  pub date: DateTime<Utc>,
  pub topics: Vec<String>,
  pub difficulty: String,
  pub score: u32,
  pub total: u32,
  pub score_percentage: u32,
}

/// A quiz result before the store assigns `id` and `date`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuizResult {
  pub user_id: String,
  pub topics: Vec<String>,
  pub difficulty: String,
  pub score: u32,
  pub total: u32,
  pub score_percentage: u32,
}

/// Screens of the quiz, in the order a user normally walks through them.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
  #[default]
  LanguageSelection,
  Auth,
  Dashboard,
  CategorySelection,
  DifficultySelection,
  Quiz,
  Results,
}

impl GameState {
  pub fn as_str(self) -> &'static str {
    match self {
      GameState::LanguageSelection => "language_selection",
      GameState::Auth => "auth",
      GameState::Dashboard => "dashboard",
      GameState::CategorySelection => "category_selection",
      GameState::DifficultySelection => "difficulty_selection",
      GameState::Quiz => "quiz",
      GameState::Results => "results",
    }
  }
}

impl std::fmt::Display for GameState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(correct: &str) -> Question {
    Question {
      question: "Capital of Morocco?".into(),
      options: vec!["Rabat".into(), "Fes".into(), "Casablanca".into(), "Tangier".into()],
      correct_answer: correct.into(),
    }
  }

  #[test]
  fn well_formed_requires_answer_among_options() {
    assert!(q("Rabat").is_well_formed());
    assert!(!q("Marrakesh").is_well_formed());
  }

  #[test]
  fn well_formed_requires_four_options() {
    let mut three = q("Rabat");
    three.options.pop();
    assert!(!three.is_well_formed());
  }

  #[test]
  fn language_codes_and_direction() {
    assert_eq!(Language::from_code(" AR "), Some(Language::Ar));
    assert_eq!(Language::from_code("fr"), None);
    assert_eq!(Language::Ar.dir(), "rtl");
    assert_eq!(Language::En.dir(), "ltr");
  }

  #[test]
  fn question_uses_camel_case_on_the_wire() {
    let json = serde_json::to_value(q("Rabat")).unwrap();
    assert_eq!(json["correctAnswer"], "Rabat");
  }
}
