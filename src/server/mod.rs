//! HTTP surface: a composable axum `Router` over the drafting pipeline.
//!
//! Routes:
//! - `GET /` — static landing page
//! - `POST /upload/` — multipart notice upload, returns scraped fields and
//!   a download URL
//! - `GET /download/` — most recently generated letter
//! - `GET /download/:id` — specific letter by id
//!
//! The router owns no behaviour of its own beyond CORS, request tracing,
//! and the body-size cap; everything interesting happens in
//! [`crate::draft`] and [`handlers`]. Returning a plain `Router` keeps it
//! mountable from tests via `tower::ServiceExt::oneshot` without binding a
//! socket.

pub mod error;
pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::DraftConfig;
use crate::error::DraftError;
use crate::pipeline::llm::ChatClient;
use crate::server::store::DraftStore;

/// Maximum accepted multipart body size (notice + reference combined).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared per-process state: config, one chat client, the letter store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DraftConfig>,
    pub client: ChatClient,
    pub store: Arc<DraftStore>,
}

impl AppState {
    /// Build the state, resolving the API credential and opening the
    /// letter store directory. Fails fast so a misconfigured server never
    /// starts accepting uploads.
    pub fn new(config: DraftConfig, store_dir: impl Into<std::path::PathBuf>) -> Result<Self, DraftError> {
        let client = ChatClient::resolve(&config)?;
        let store = DraftStore::new(store_dir)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            store: Arc::new(store),
        })
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/upload/", post(handlers::upload))
        .route("/download/", get(handlers::download_latest))
        .route("/download/:id", get(handlers::download_by_id))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
