//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::{Category, GameState, Language, QuizResult, User};
use crate::i18n::strings;
use crate::quiz::QuizFlow;
use crate::scoring::{self, ReviewItem, ScoreBand};

/// Everything a client can ask a session to do. Shared by HTTP and WebSocket.
///
/// No `Debug`: sign-up and sign-in carry passwords. Log `name()` instead.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    SelectLanguage {
        language: Language,
    },
    SignUp {
        name: String,
        email: String,
        password: String,
    },
    SignIn {
        email: String,
        password: String,
    },
    SignOut,
    StartNewQuiz,
    ToggleTopic {
        topic: String,
    },
    ConfirmCategories {
        #[serde(default)]
        topics: Option<Vec<String>>,
    },
    BackToCategories,
    BackToDashboard,
    SelectDifficulty {
        difficulty: String,
    },
    SelectOption {
        option: String,
    },
    NextQuestion,
    SkipQuestion,
    PlayAgain,
    Retry,
}

impl ClientAction {
    pub fn name(&self) -> &'static str {
        match self {
            ClientAction::SelectLanguage { .. } => "select_language",
            ClientAction::SignUp { .. } => "sign_up",
            ClientAction::SignIn { .. } => "sign_in",
            ClientAction::SignOut => "sign_out",
            ClientAction::StartNewQuiz => "start_new_quiz",
            ClientAction::ToggleTopic { .. } => "toggle_topic",
            ClientAction::ConfirmCategories { .. } => "confirm_categories",
            ClientAction::BackToCategories => "back_to_categories",
            ClientAction::BackToDashboard => "back_to_dashboard",
            ClientAction::SelectDifficulty { .. } => "select_difficulty",
            ClientAction::SelectOption { .. } => "select_option",
            ClientAction::NextQuestion => "next_question",
            ClientAction::SkipQuestion => "skip_question",
            ClientAction::PlayAgain => "play_again",
            ClientAction::Retry => "retry",
        }
    }
}

/// Messages the client can send over WebSocket.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    State,
    Action { action: ClientAction },
}

/// Messages the server sends back over WebSocket.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerWsMessage {
    Pong,
    State { view: SessionView },
    Loading { message: String, sub_message: String },
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct LanguageOut {
    pub code: &'static str,
    pub name: &'static str,
    pub dir: &'static str,
}

pub fn languages() -> Vec<LanguageOut> {
    Language::ALL
        .iter()
        .map(|l| LanguageOut { code: l.code(), name: l.native_name(), dir: l.dir() })
        .collect()
}

/// A stored result plus the short topic label the dashboard shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub result: QuizResult,
    pub topics_label: String,
}

pub fn history_entries(lang: Language, results: Vec<QuizResult>) -> Vec<HistoryEntry> {
    let t = strings(lang);
    results
        .into_iter()
        .map(|result| HistoryEntry { topics_label: t.topics_label(&result.topics), result })
        .collect()
}

/// What the client needs to render the current screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub language: Language,
    pub dir: &'static str,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(flatten)]
    pub screen: ScreenView,
}

impl SessionView {
    pub fn screen_name(&self) -> &'static str {
        match self.screen {
            ScreenView::LanguageSelection { .. } => "language_selection",
            ScreenView::Auth {} => "auth",
            ScreenView::Dashboard { .. } => "dashboard",
            ScreenView::CategorySelection { .. } => "category_selection",
            ScreenView::DifficultySelection { .. } => "difficulty_selection",
            ScreenView::Quiz { .. } => "quiz",
            ScreenView::Results { .. } => "results",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ScreenView {
    LanguageSelection {
        languages: Vec<LanguageOut>,
    },
    Auth {},
    Dashboard {
        welcome: String,
        results: Vec<HistoryEntry>,
    },
    CategorySelection {
        categories: Vec<Category>,
        selected: Vec<String>,
    },
    DifficultySelection {
        topics: Vec<String>,
        difficulties: Vec<String>,
    },
    Quiz {
        number: usize,
        total: usize,
        question: String,
        options: Vec<String>,
        selected: Option<String>,
        progress_percent: u32,
        is_last: bool,
    },
    Results {
        score: u32,
        total: u32,
        percentage: u32,
        band: ScoreBand,
        review: Vec<ReviewItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        result_id: Option<String>,
    },
}

/// Build the view of `flow`. `history` is only used on the dashboard.
pub fn build_view(session_id: &str, flow: &QuizFlow, catalog: &Catalog, history: Vec<QuizResult>) -> SessionView {
    let lang = flow.language;
    let t = strings(lang);
    let screen = match flow.state {
        GameState::LanguageSelection => ScreenView::LanguageSelection { languages: languages() },
        GameState::Auth => ScreenView::Auth {},
        GameState::Dashboard => ScreenView::Dashboard {
            welcome: flow.user.as_ref().map(|u| t.welcome(&u.name)).unwrap_or_default(),
            results: history_entries(lang, history),
        },
        GameState::CategorySelection => ScreenView::CategorySelection {
            categories: catalog.categories(lang).to_vec(),
            selected: flow.selected_topics.clone(),
        },
        GameState::DifficultySelection => ScreenView::DifficultySelection {
            topics: flow.selected_topics.clone(),
            difficulties: catalog.difficulties(lang).to_vec(),
        },
        GameState::Quiz => {
            let q = flow.current_question();
            ScreenView::Quiz {
                number: flow.current_index + 1,
                total: flow.questions.len(),
                question: q.map(|q| q.question.clone()).unwrap_or_default(),
                options: q.map(|q| q.options.clone()).unwrap_or_default(),
                selected: flow.selected_option.clone(),
                progress_percent: flow.progress_percent(),
                is_last: flow.is_last_question(),
            }
        }
        GameState::Results => {
            let total = flow.questions.len() as u32;
            let score = scoring::score(&flow.questions, &flow.answers);
            let percentage = scoring::percentage(score, total);
            ScreenView::Results {
                score,
                total,
                percentage,
                band: scoring::band(percentage),
                review: scoring::review(&flow.questions, &flow.answers),
                result_id: flow.last_result.as_ref().map(|r| r.id.clone()),
            }
        }
    };

    let loading_message = flow.loading.then(|| {
        let difficulty = flow.difficulty.as_deref().unwrap_or_default();
        t.loading_message(difficulty, &t.topics_label(&flow.selected_topics))
    });

    SessionView {
        session_id: session_id.to_string(),
        language: lang,
        dir: lang.dir(),
        loading: flow.loading,
        loading_message,
        error: flow.error.clone(),
        user: flow.user.clone(),
        screen,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub language: Option<String>,
}

#[derive(Serialize)]
pub struct CatalogOut {
    pub language: Language,
    pub categories: Vec<Category>,
    pub difficulties: Vec<String>,
}

#[derive(Serialize)]
pub struct HistoryOut {
    pub results: Vec<HistoryEntry>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub generator: &'static str,
}
