//! API request and response types

use crate::session::{DisplayEntry, SessionId};
use serde::{Deserialize, Serialize};

/// Response for session creation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub id: SessionId,
}

/// Snapshot of one session, enough to redraw the page
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub active: bool,
    pub has_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_image: Option<String>,
    pub transcript_len: usize,
    pub entries: Vec<DisplayEntry>,
}

/// Response for an upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// False when a session was already active and the upload was ignored
    pub accepted: bool,
}

/// Request to edit the current image
#[derive(Debug, Serialize, Deserialize)]
pub struct EditRequest {
    pub prompt: String,
}

/// Response for an edit turn
#[derive(Debug, Serialize, Deserialize)]
pub struct EditResponse {
    /// Display entries appended by this turn
    pub entries: Vec<DisplayEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_text: Option<String>,
    pub new_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_image: Option<String>,
}

/// Response for the display log
#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub entries: Vec<DisplayEntry>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
