use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod client;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use config::Config;
use services::NoteService;
use store::NoteStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub notes: NoteService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Arc<Config>) -> Self {
        let notes = NoteService::new(NoteStore::new(db.clone()));
        Self { db, notes, config }
    }
}

/// Builds the HTTP application: JSON API, health probes and, when
/// configured, the static page shell as a fallback.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route(
            "/api/notes",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route("/api/notes/:id", delete(handlers::notes::delete_note));

    let mut app = match state.config.static_dir.as_ref() {
        Some(dir) if dir.is_dir() => api.fallback_service(ServeDir::new(dir)),
        Some(dir) => {
            tracing::warn!(dir = %dir.display(), "Static directory not found, serving API only");
            api
        }
        None => api,
    };

    if let Some(cors) = cors_layer(&state.config) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
    )
}
