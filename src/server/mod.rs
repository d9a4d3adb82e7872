//! HTTP surface: one multipart endpoint, mounted twice.
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /process-image` | [`handler::process_image`] |
//! | `POST /api/process-image` | same handler |
//!
//! Requests share nothing mutable. The config and backend sit behind `Arc`s
//! in [`AppState`]; codec work runs on tokio's blocking pool.

pub mod error;
pub mod form;
pub mod handler;

pub use error::ApiError;
pub use form::{FormFields, UploadForm, UploadedFile};
pub use handler::process_upload;

use crate::config::ServiceConfig;
use crate::imaging::RustBackend;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use std::sync::Arc;

/// Slack over the file limit for multipart framing and the option fields,
/// so an oversized file is reported as such rather than as a cut-off body.
const FORM_OVERHEAD: u64 = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub backend: Arc<RustBackend>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let backend = RustBackend::with_filter(config.processing.filter);
        Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.limits.max_file_size.saturating_add(FORM_OVERHEAD))
        .unwrap_or(usize::MAX);
    Router::new()
        .route("/process-image", post(handler::process_image))
        .route("/api/process-image", post(handler::process_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind `config.server.bind` and serve until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        max_file_size = config.limits.max_file_size,
        "listening"
    );
    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
