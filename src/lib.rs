//! Trivia quiz backend.
//!
//! - Axum HTTP + WebSocket API driving a per-session quiz flow
//! - Account and history store (memory or JSON file)
//! - Optional OpenAI question generation, with a built-in offline bank
//! - Static SPA fallback (STATIC_DIR/index.html)

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod logic;
pub mod openai;
pub mod protocol;
pub mod quiz;
pub mod routes;
pub mod scoring;
pub mod seeds;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
