//! HTTP transport around the merge engine.
//!
//! Routes:
//! - `POST /merge` – merge uploaded spectra, store and return the CSV
//! - `GET /generated/:file` – re-download a stored CSV
//! - `POST /api/sessions`, `GET /api/sessions/:id` – opaque session blobs
//! - `GET /health`
//! - anything else is served from the public directory

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::ServerArgs;
use crate::data::merge::MergeOptions;
use crate::error::Result;
use crate::session::SessionStore;

pub mod error;
pub mod handlers;

/// Application state shared across HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub options: MergeOptions,
    pub generated_dir: PathBuf,
    pub public_dir: PathBuf,
    pub sessions: SessionStore,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Build state from parsed arguments, creating the session directory.
    pub fn from_args(args: &ServerArgs) -> Result<Self> {
        Ok(AppState {
            options: args.merge_options(),
            generated_dir: args.generated_dir.clone(),
            public_dir: args.public_dir.clone(),
            sessions: SessionStore::open(&args.sessions_dir)?,
            max_body_bytes: args.max_body_bytes,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.public_dir);
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .route("/merge", post(handlers::merge))
        .route("/generated/:file", get(handlers::download_generated))
        .route("/api/sessions", post(handlers::create_session))
        .route("/api/sessions/:id", get(handlers::get_session))
        .route("/health", get(handlers::health))
        .fallback_service(static_files)
        .layer(body_limit)
        .with_state(state)
}
