//! End-to-end tests of the HTTP API, driving the router in-process.
//!
//! The generator runs offline (built-in bank) unless a test wires an OpenAI client.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use trivia_backend::config::Settings;
use trivia_backend::openai::OpenAI;
use trivia_backend::routes::build_router;
use trivia_backend::state::{spawn_session_sweeper, AppState};

// =============================================================================
// HELPERS
// =============================================================================

fn settings(dir: &TempDir) -> Settings {
    Settings {
        question_count: 3,
        data_path: Some(dir.path().join("trivia.json")),
        static_dir: dir.path().join("static"),
        ..Settings::default()
    }
}

async fn app_with(settings: Settings, openai: Option<OpenAI>) -> Router {
    let state = AppState::build(settings, None, openai).await.expect("state");
    build_router(Arc::new(state))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, view) = call(app, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    view["sessionId"].as_str().unwrap().to_string()
}

async fn act(app: &Router, session: &str, action: Value) -> (StatusCode, Value) {
    call(app, Method::POST, &format!("/api/v1/sessions/{session}/actions"), Some(action)).await
}

async fn act_ok(app: &Router, session: &str, action: Value) -> Value {
    let (status, view) = act(app, session, action.clone()).await;
    assert_eq!(status, StatusCode::OK, "action {action} failed: {view}");
    view
}

/// Fresh session, English, signed up, on the dashboard.
async fn signed_up(app: &Router, email: &str) -> String {
    let s = new_session(app).await;
    act_ok(app, &s, json!({"type": "select_language", "language": "en"})).await;
    let view = act_ok(
        app,
        &s,
        json!({"type": "sign_up", "name": "Layla", "email": email, "password": "secret1"}),
    )
    .await;
    assert_eq!(view["screen"], "dashboard");
    s
}

/// Answer every question with its first option; returns the results view.
async fn answer_all_first(app: &Router, s: &str, mut view: Value) -> Value {
    while view["screen"] == "quiz" {
        let first = view["options"][0].as_str().unwrap().to_string();
        act_ok(app, s, json!({"type": "select_option", "option": first})).await;
        view = act_ok(app, s, json!({"type": "next_question"})).await;
    }
    view
}

// =============================================================================
// SERVICE ENDPOINTS
// =============================================================================

#[tokio::test]
async fn health_reports_offline_generator() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let (status, body) = call(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "generator": "offline"}));
}

#[tokio::test]
async fn catalog_is_per_language() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;

    let (status, ar) = call(&app, Method::GET, "/api/v1/catalog?language=ar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ar["language"], "ar");
    assert_eq!(ar["difficulties"], json!(["سهل", "متوسط", "صعب"]));

    let (status, _) = call(&app, Method::GET, "/api/v1/catalog?language=fr", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, langs) = call(&app, Method::GET, "/api/v1/languages", None).await;
    assert_eq!(langs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let (status, body) = call(&app, Method::GET, "/api/v1/sessions/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
    let (status, _) = act(&app, "nope", json!({"type": "retry"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn idle_session_expires() {
    let dir = tempfile::tempdir().unwrap();
    let state = Settings { session_ttl: Duration::from_millis(100), ..settings(&dir) };
    let state = Arc::new(AppState::build(state, None, None).await.unwrap());
    let sweeper = spawn_session_sweeper(state.clone());
    let app = build_router(state.clone());

    let idle = new_session(&app).await;
    let busy = new_session(&app).await;
    for _ in 0..8 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (status, _) = call(&app, Method::GET, &format!("/api/v1/sessions/{busy}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = call(&app, Method::GET, &format!("/api/v1/sessions/{idle}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    sweeper.abort();
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let s = new_session(&app).await;
    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/sessions/{s}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &format!("/api/v1/sessions/{s}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// QUIZ FLOW
// =============================================================================

#[tokio::test]
async fn full_quiz_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;

    let s = new_session(&app).await;
    let (_, view) = call(&app, Method::GET, &format!("/api/v1/sessions/{s}"), None).await;
    assert_eq!(view["screen"], "language_selection");

    // Out of order.
    let (status, _) = act(&app, &s, json!({"type": "start_new_quiz"})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let view = act_ok(&app, &s, json!({"type": "select_language", "language": "en"})).await;
    assert_eq!(view["screen"], "auth");
    assert_eq!(view["dir"], "ltr");

    let view = act_ok(
        &app,
        &s,
        json!({"type": "sign_up", "name": "Layla", "email": "layla@example.com", "password": "123"}),
    )
    .await;
    assert_eq!(view["screen"], "auth");
    assert_eq!(view["error"], "Password must be at least 6 characters.");

    let view = act_ok(
        &app,
        &s,
        json!({"type": "sign_up", "name": "Layla", "email": "layla@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(view["screen"], "dashboard");
    assert_eq!(view["welcome"], "Welcome, Layla!");
    assert_eq!(view["results"], json!([]));
    assert!(view.get("error").is_none());

    let view = act_ok(&app, &s, json!({"type": "start_new_quiz"})).await;
    assert_eq!(view["screen"], "category_selection");

    let (status, _) = act(&app, &s, json!({"type": "confirm_categories", "topics": []})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let view = act_ok(
        &app,
        &s,
        json!({"type": "confirm_categories", "topics": ["Football", "Cuisine", "Music"]}),
    )
    .await;
    assert_eq!(view["screen"], "difficulty_selection");
    assert_eq!(view["difficulties"], json!(["Easy", "Medium", "Hard"]));

    let view = act_ok(&app, &s, json!({"type": "select_difficulty", "difficulty": "Medium"})).await;
    assert_eq!(view["screen"], "quiz");
    assert_eq!(view["total"], 3);
    assert_eq!(view["number"], 1);
    assert_eq!(view["progressPercent"], 0);

    let results = answer_all_first(&app, &s, view).await;
    assert_eq!(results["screen"], "results");
    assert_eq!(results["total"], 3);

    let review = results["review"].as_array().unwrap();
    let correct = review.iter().filter(|r| r["status"] == "correct").count() as u64;
    assert_eq!(results["score"], correct);
    let expected_pct = (correct * 200 + 3) / 6;
    assert_eq!(results["percentage"], expected_pct);
    assert!(results["resultId"].is_string());

    let (status, history) = call(&app, Method::GET, &format!("/api/v1/sessions/{s}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = history["results"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["topicsLabel"], "Football, Cuisine & more");
    assert_eq!(entries[0]["difficulty"], "Medium");
    assert_eq!(entries[0]["scorePercentage"], expected_pct);

    let view = act_ok(&app, &s, json!({"type": "back_to_dashboard"})).await;
    assert_eq!(view["screen"], "dashboard");
    assert_eq!(view["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn skipping_every_question_scores_zero() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let s = signed_up(&app, "omar@example.com").await;

    act_ok(&app, &s, json!({"type": "start_new_quiz"})).await;
    act_ok(&app, &s, json!({"type": "toggle_topic", "topic": "Capitals"})).await;
    act_ok(&app, &s, json!({"type": "confirm_categories"})).await;
    let mut view = act_ok(&app, &s, json!({"type": "select_difficulty", "difficulty": "Easy"})).await;
    while view["screen"] == "quiz" {
        view = act_ok(&app, &s, json!({"type": "skip_question"})).await;
    }
    assert_eq!(view["score"], 0);
    assert_eq!(view["percentage"], 0);
    assert_eq!(view["band"], "low");
    assert!(view["review"].as_array().unwrap().iter().all(|r| r["status"] == "skipped"));
}

#[tokio::test]
async fn history_requires_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let s = new_session(&app).await;
    let (status, _) = call(&app, Method::GET, &format!("/api/v1/sessions/{s}/history"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn arabic_session_is_right_to_left() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let s = new_session(&app).await;
    let view = act_ok(&app, &s, json!({"type": "select_language", "language": "ar"})).await;
    assert_eq!(view["dir"], "rtl");
    let view = act_ok(
        &app,
        &s,
        json!({"type": "sign_in", "email": "nobody@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(view["screen"], "auth");
    assert_eq!(view["error"], "البريد الإلكتروني أو كلمة المرور غير صحيحة.");
}

// =============================================================================
// ACCOUNTS AND PERSISTENCE
// =============================================================================

#[tokio::test]
async fn accounts_and_history_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let app = app_with(settings(&dir), None).await;
        let s = signed_up(&app, "salma@example.com").await;
        act_ok(&app, &s, json!({"type": "start_new_quiz"})).await;
        act_ok(&app, &s, json!({"type": "confirm_categories", "topics": ["Astronomy"]})).await;
        let view = act_ok(&app, &s, json!({"type": "select_difficulty", "difficulty": "Hard"})).await;
        let results = answer_all_first(&app, &s, view).await;
        assert_eq!(results["screen"], "results");
    }

    let app = app_with(settings(&dir), None).await;
    let s = new_session(&app).await;
    act_ok(&app, &s, json!({"type": "select_language", "language": "en"})).await;

    let view = act_ok(
        &app,
        &s,
        json!({"type": "sign_in", "email": "salma@example.com", "password": "wrong-one"}),
    )
    .await;
    assert_eq!(view["error"], "Invalid email or password.");

    let view = act_ok(
        &app,
        &s,
        json!({"type": "sign_in", "email": "SALMA@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(view["screen"], "dashboard");
    let results = view["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["topics"], json!(["Astronomy"]));
}

#[tokio::test]
async fn duplicate_sign_up_shows_message() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    signed_up(&app, "dup@example.com").await;

    let s = new_session(&app).await;
    act_ok(&app, &s, json!({"type": "select_language", "language": "en"})).await;
    let view = act_ok(
        &app,
        &s,
        json!({"type": "sign_up", "name": "Dup", "email": "dup@example.com", "password": "secret1"}),
    )
    .await;
    assert_eq!(view["screen"], "auth");
    assert_eq!(view["error"], "An account with this email already exists.");
}

#[tokio::test]
async fn sign_out_returns_to_auth() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(settings(&dir), None).await;
    let s = signed_up(&app, "out@example.com").await;
    let view = act_ok(&app, &s, json!({"type": "sign_out"})).await;
    assert_eq!(view["screen"], "auth");
    assert!(view.get("user").is_none());
}

// =============================================================================
// GENERATION FAILURE
// =============================================================================

#[tokio::test]
async fn generation_failure_is_shown_and_retry_restarts() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens on port 9 locally; the request fails fast.
    let openai = OpenAI {
        client: reqwest::Client::builder().timeout(Duration::from_secs(5)).build().unwrap(),
        api_key: "test-key".into(),
        base_url: "http://127.0.0.1:9/v1".into(),
        model: "test-model".into(),
    };
    let app = app_with(settings(&dir), Some(openai)).await;

    let (_, health) = call(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(health["generator"], "openai");

    let s = signed_up(&app, "fail@example.com").await;
    act_ok(&app, &s, json!({"type": "start_new_quiz"})).await;
    act_ok(&app, &s, json!({"type": "confirm_categories", "topics": ["Football"]})).await;

    let view = act_ok(&app, &s, json!({"type": "select_difficulty", "difficulty": "Easy"})).await;
    assert_eq!(view["screen"], "difficulty_selection");
    assert_eq!(view["loading"], false);
    assert_eq!(
        view["error"],
        "Failed to generate the quiz. Please try a different category or try again later."
    );

    let view = act_ok(&app, &s, json!({"type": "retry"})).await;
    assert_eq!(view["screen"], "category_selection");
    assert!(view.get("error").is_none());
    assert_eq!(view["selected"], json!([]));
}
