//! Route handlers and error translation.
//!
//! The handlers own nothing but parsing and status mapping; all behavior
//! lives in `eduscan_core::StudyPipeline`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use eduscan_core::{Document, PipelineError, StudyPack, StudyPipeline};

/// Multipart uploads beyond this are rejected outright.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<StudyPipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/summarize-pdf", post(summarize_pdf))
        .route("/summarize-images", post(summarize_images))
        .route("/ask-sakhi", post(ask_sakhi))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ============================================================================
// Error type
// ============================================================================

struct ApiError(StatusCode, serde_json::Value);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

fn bad_request(message: &str) -> ApiError {
    ApiError(StatusCode::BAD_REQUEST, json!({"error": message}))
}

fn internal_error(err: &PipelineError) -> ApiError {
    ApiError(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "An internal server error occurred",
            "details": err.to_string(),
        }),
    )
}

fn summarize_error(err: PipelineError, no_text_message: &str) -> ApiError {
    match err {
        PipelineError::NoTextFound => bad_request(no_text_message),
        other => {
            tracing::error!(error = %other, "summarize request failed");
            internal_error(&other)
        }
    }
}

fn chat_error(err: PipelineError) -> ApiError {
    tracing::error!(error = %err, "chat request failed");
    if err.is_transport() {
        ApiError(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "error": "Failed to connect to AI service",
                "details": err.to_string(),
            }),
        )
    } else {
        internal_error(&err)
    }
}

// ============================================================================
// Handlers
// ============================================================================

// POST /summarize-pdf  (multipart, field "pdf")
async fn summarize_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StudyPack>, ApiError> {
    let mut pdf: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(&format!("Invalid multipart body: {}", err)))?
    {
        if field.name() == Some("pdf") {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| bad_request(&format!("Failed to read PDF part: {}", err)))?;
            pdf = Some(bytes.to_vec());
        }
    }

    let Some(bytes) = pdf else {
        return Err(bad_request("No PDF file part"));
    };

    let pack = state
        .pipeline
        .summarize(Document::Pdf(bytes))
        .await
        .map_err(|err| summarize_error(err, "No text found in PDF"))?;
    Ok(Json(pack))
}

// POST /summarize-images  (multipart, repeated field "images")
async fn summarize_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StudyPack>, ApiError> {
    let mut images: Vec<Vec<u8>> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(&format!("Invalid multipart body: {}", err)))?
    {
        if field.name() == Some("images") {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| bad_request(&format!("Failed to read image part: {}", err)))?;
            images.push(bytes.to_vec());
        }
    }

    if images.is_empty() {
        return Err(bad_request("No image file parts"));
    }

    let pack = state
        .pipeline
        .summarize(Document::Images(images))
        .await
        .map_err(|err| summarize_error(err, "No text found in images"))?;
    Ok(Json(pack))
}

#[derive(Deserialize)]
struct AskRequest {
    prompt: Option<String>,
}

#[derive(Serialize)]
struct AskResponse {
    response: String,
}

// POST /ask-sakhi  (JSON {"prompt": ...})
async fn ask_sakhi(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let prompt = payload
        .ok()
        .and_then(|Json(request)| request.prompt)
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or_else(|| bad_request("No prompt provided"))?;

    let response = state.pipeline.chat(&prompt).await.map_err(chat_error)?;
    Ok(Json(AskResponse { response }))
}

// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
