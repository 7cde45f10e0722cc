//! Logging setup (tracing-subscriber).
//!
//! `LOG_LEVEL` takes an EnvFilter directive string, for example
//! "info,quiz=debug,trivia_backend=debug". `LOG_FORMAT=json` switches to one
//! JSON object per line; anything else gives the human-readable format.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,quiz=debug,trivia_backend=debug,tower_http=info,axum=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The json and pretty builders are different types; install each in its own arm.
    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = installed {
        eprintln!("tracing subscriber already installed: {e}");
        return;
    }
    tracing::debug!(target: "trivia_backend", ?format, "Logging initialised");
}
