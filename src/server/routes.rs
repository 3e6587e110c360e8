//! Route handlers.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::AppState;
use crate::storage::Upload;
use crate::types::{PredictionReport, ReportSummary};
use crate::view::PageView;
use crate::{BreedscopeError, Result};

/// Multipart field carrying the photo.
pub const PHOTO_FIELD: &str = "photo";

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Response {
    let report = state.handler().default_report().await;
    render(&state, StatusCode::OK, &PageView::from_report(&report))
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    match run_upload(&state, multipart).await {
        Ok(report) => render(&state, StatusCode::OK, &PageView::from_upload(&report)),
        Err(e) => {
            let status = error_status(&e);
            render(&state, status, &PageView::rejected(e.user_message()))
        }
    }
}

/// `POST /api/predict`
pub async fn api_predict(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    match run_upload(&state, multipart).await {
        Ok(report) => Json(ReportSummary::from(&report)).into_response(),
        Err(e) => (error_status(&e), Json(json!({ "error": e.user_message() }))).into_response(),
    }
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    version: String,
    provider: &'a str,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        version: crate::version_string(),
        provider: state.handler().provider_name(),
    })
    .into_response()
}

async fn run_upload(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<PredictionReport> {
    // A request that is not multipart at all carries no photo either.
    let upload = match multipart {
        Ok(multipart) => extract_photo(multipart).await?,
        Err(_) => None,
    };
    state.handler().handle_upload(upload).await
}

/// Pull the first file part named `photo`, ignoring everything else.
///
/// Plain form fields named `photo` (no file name) do not count as uploads.
async fn extract_photo(mut multipart: Multipart) -> Result<Option<Upload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BreedscopeError::Multipart(e.to_string()))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| BreedscopeError::Multipart(e.to_string()))?;
        return Ok(Some(Upload::new(file_name, bytes.to_vec())));
    }
    Ok(None)
}

fn error_status(err: &BreedscopeError) -> StatusCode {
    if err.is_user_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!(error = %err, "upload failed");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn render(state: &AppState, status: StatusCode, view: &PageView) -> Response {
    match state.renderer().render(view) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}
