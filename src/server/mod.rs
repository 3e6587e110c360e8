//! HTTP surface.
//!
//! - `GET /`: sample photo with its predictions
//! - `POST /predict`: multipart upload in field `photo`, rendered as HTML
//! - `POST /api/predict`: same upload, answered as JSON
//! - `GET /health`: liveness and build info
//! - `GET /static/img/*`: stored uploads
//!
//! Routes hold no per-request state beyond [`AppState`], which wraps the
//! handler and renderer built once at startup.

#[cfg(feature = "server")]
pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handler::PredictionHandler;
use crate::view::PageRenderer;

/// Default cap on request bodies (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where stored photos are served from; the page template links here.
pub const STATIC_IMG_PATH: &str = "/static/img";

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    handler: PredictionHandler,
    renderer: PageRenderer,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(handler: PredictionHandler, renderer: PageRenderer) -> Self {
        Self::with_upload_limit(handler, renderer, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn with_upload_limit(
        handler: PredictionHandler,
        renderer: PageRenderer,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                handler,
                renderer,
                max_upload_bytes,
            }),
        }
    }

    pub fn handler(&self) -> &PredictionHandler {
        &self.inner.handler
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.inner.renderer
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.handler().store().root());

    Router::new()
        .route("/", get(routes::home))
        .route("/predict", post(routes::predict))
        .route("/api/predict", post(routes::api_predict))
        .route("/health", get(routes::health))
        .nest_service(STATIC_IMG_PATH, static_files)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
