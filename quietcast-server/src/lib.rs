//! quietcast-server library
//!
//! Application state and router for the Quietcast HTTP service.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::media::{MediaClient, MAX_AUDIO_BYTES};

pub mod api;
pub mod error;
pub mod media;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Hosted media store client
    pub media: Arc<MediaClient>,
    /// Session token signing secret (settings table)
    pub session_secret: String,
}

impl AppState {
    pub fn new(db: SqlitePool, media: MediaClient, session_secret: String) -> Self {
        Self {
            db,
            media: Arc::new(media),
            session_secret,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, patch, post};

    Router::new()
        .route(
            "/api/episodes",
            get(api::episodes::list_episodes).post(api::episodes::create_episode),
        )
        .route("/api/episodes/changes", get(api::episodes::episode_changes))
        .route("/api/episodes/public", get(api::episodes::public_episodes))
        .route("/api/episodes/publish-due", post(api::episodes::publish_due))
        .route(
            "/api/episodes/:id",
            get(api::episodes::get_episode)
                .patch(api::episodes::update_episode)
                .delete(api::episodes::delete_episode),
        )
        .route("/api/episodes/:id/audio", post(api::episodes::attach_audio))
        .route("/api/episodes/:id/listen", post(api::episodes::register_listen))
        .route("/api/audio/upload", post(api::audio::upload_audio))
        .route("/api/audio/delete", post(api::audio::delete_audio))
        .route(
            "/api/listeners",
            get(api::listeners::list_listeners).post(api::listeners::create_listener),
        )
        .route(
            "/api/listeners/:id",
            patch(api::listeners::update_listener).delete(api::listeners::delete_listener),
        )
        .route("/api/auth/signup", post(api::auth::signup))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/session", get(api::auth::session))
        .route("/api/profile", patch(api::auth::update_profile))
        .route("/api/account", delete(api::auth::delete_account))
        .merge(api::health::health_routes())
        // Multipart audio uploads need headroom over the payload cap
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES + 1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
