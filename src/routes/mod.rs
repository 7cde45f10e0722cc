//! Router assembly.
//!
//! `/ws` carries the live session protocol, `/api/v1` the same session
//! operations over plain HTTP. Anything else is served from the static
//! frontend directory, falling back to its `index.html`.

use std::{path::Path, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_status::SetStatus,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

pub fn build_router(state: Arc<AppState>) -> Router {
    let frontend = frontend_service(&state.settings.static_dir);

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(frontend)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(http::http_health))
        .route("/languages", get(http::http_languages))
        .route("/catalog", get(http::http_catalog))
        .route("/sessions", post(http::http_create_session))
        .route(
            "/sessions/:id",
            get(http::http_get_session).delete(http::http_delete_session),
        )
        .route("/sessions/:id/actions", post(http::http_post_action))
        .route("/sessions/:id/history", get(http::http_get_history))
}

/// Single-page app: unknown paths get `index.html` so client-side routing works.
fn frontend_service(dir: &Path) -> ServeDir<SetStatus<ServeFile>> {
    ServeDir::new(dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(dir.join("index.html")))
}
