//! HTTP request handlers

use super::assets::get_index_html;
use super::types::{
    CreateSessionResponse, EditRequest, EditResponse, ErrorResponse, LogResponse,
    SessionResponse, SuccessResponse, UploadResponse,
};
use super::AppState;
use crate::images::{self, ImageError, DOWNLOAD_FILE_NAME, DOWNLOAD_MEDIA_TYPE};
use crate::llm::LlmError;
use crate::session::{Session, SessionError, SessionId, UploadOutcome};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the editor page
        .route("/", get(serve_page))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Image in and out
        .route(
            "/api/sessions/:id/upload",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/sessions/:id/image", get(download_image))
        // Conversation
        .route("/api/sessions/:id/edit", post(edit_image))
        .route("/api/sessions/:id/log", get(get_log))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - editor page not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn lookup(state: &AppState, id: &SessionId) -> Result<Arc<Session>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Unknown session: {id}")))
}

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let id = state.sessions.create().await;
    Json(CreateSessionResponse { id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = lookup(&state, &id).await?;
    let manager = session.lock().await;

    Ok(Json(SessionResponse {
        id,
        active: manager.is_active(),
        has_image: manager.current_image().is_some(),
        current_image: manager.current_image().map(str::to_string),
        transcript_len: manager.transcript().len(),
        entries: manager.render_log().cloned().collect(),
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Unknown session: {id}")))
    }
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SuccessResponse>, AppError> {
    let session = lookup(&state, &id).await?;
    session.lock().await.reset();
    tracing::info!(session = %id, "Session reset");
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Upload / Download
// ============================================================

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Upload body is empty".to_string()));
    }

    let session = lookup(&state, &id).await?;
    let outcome = session.lock().await.ingest_upload(&body);

    match outcome {
        UploadOutcome::Accepted => {
            tracing::info!(session = %id, bytes = body.len(), "Image uploaded");
        }
        UploadOutcome::Ignored => {
            tracing::debug!(session = %id, "Upload ignored, session already active");
        }
    }

    Ok(Json(UploadResponse {
        accepted: outcome == UploadOutcome::Accepted,
    }))
}

async fn download_image(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Response, AppError> {
    let session = lookup(&state, &id).await?;
    let current = session
        .lock()
        .await
        .current_image()
        .map(str::to_string)
        .ok_or_else(|| AppError::NotFound("No image to download".to_string()))?;

    let bytes = images::decode_b64(&current)?;

    Ok((
        [
            (header::CONTENT_TYPE, DOWNLOAD_MEDIA_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ============================================================
// Conversation
// ============================================================

/// One edit turn: build the payload, make the single remote call, record it.
///
/// The session stays locked for the whole turn. A failed call returns before
/// anything is recorded.
async fn edit_image(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    if req.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("Prompt must not be empty".to_string()));
    }

    let session = lookup(&state, &id).await?;
    let mut manager = session.lock().await;

    let turns = manager.build_request(&req.prompt)?;
    tracing::info!(session = %id, turns = turns.len(), "Sending edit request");

    let outputs = state.service.respond(&turns).await;
    // Idle time is measured from the end of the remote call
    session.touch();
    let outputs = outputs?;
    let applied = manager.apply_response(&req.prompt, &outputs);

    Ok(Json(EditResponse {
        entries: manager
            .render_log()
            .skip(applied.first_entry)
            .cloned()
            .collect(),
        assistant_text: applied.assistant_text,
        new_image: applied.new_image,
        current_image: manager.current_image().map(str::to_string),
    }))
}

async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<LogResponse>, AppError> {
    let session = lookup(&state, &id).await?;
    let manager = session.lock().await;
    Ok(Json(LogResponse {
        entries: manager.render_log().cloned().collect(),
    }))
}

async fn get_version() -> &'static str {
    concat!("gpt-image-editor ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    /// Remote service failed; the turn was not recorded
    Upstream(LlmError),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Upstream(e)
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(e) => {
                tracing::warn!(kind = ?e.kind, error = %e.message, "Edit turn aborted");
                let status = if e.kind.is_transient() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, e.message)
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
