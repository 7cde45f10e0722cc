//! Score arithmetic and per-question review for finished quizzes.

use serde::Serialize;

use crate::domain::{Question, SKIPPED};

/// Count of positions where the recorded answer equals the correct answer.
/// Missing and skipped answers never match.
pub fn score(questions: &[Question], answers: &[String]) -> u32 {
  questions
    .iter()
    .zip(answers.iter())
    .filter(|(q, a)| a.as_str() != SKIPPED && q.correct_answer == **a)
    .count() as u32
}

/// `round(score / total * 100)`, half rounded up. An empty quiz scores 0.
pub fn percentage(score: u32, total: u32) -> u32 {
  if total == 0 {
    return 0;
  }
  let score = score.min(total) as u64;
  let total = total as u64;
  ((score * 200 + total) / (total * 2)) as u32
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
  High,
  Medium,
  Low,
}

pub fn band(percentage: u32) -> ScoreBand {
  if percentage >= 75 {
    ScoreBand::High
  } else if percentage >= 40 {
    ScoreBand::Medium
  } else {
    ScoreBand::Low
  }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
  Correct,
  Incorrect,
  Skipped,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
  pub number: usize,
  pub question: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub your_answer: Option<String>,
  pub correct_answer: String,
  pub status: AnswerStatus,
}

pub fn review(questions: &[Question], answers: &[String]) -> Vec<ReviewItem> {
  questions
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let answer = answers.get(i).filter(|a| a.as_str() != SKIPPED);
      let status = match answer {
        None => AnswerStatus::Skipped,
        Some(a) if *a == q.correct_answer => AnswerStatus::Correct,
        Some(_) => AnswerStatus::Incorrect,
      };
      ReviewItem {
        number: i + 1,
        question: q.question.clone(),
        your_answer: answer.cloned(),
        correct_answer: q.correct_answer.clone(),
        status,
      }
    })
    .collect()
}
