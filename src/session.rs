//! Conversation state for one editing session
//!
//! Two logs are kept side by side. The transcript holds only the text turns
//! that get replayed to the service; the display log holds everything shown
//! to the user, generated images included. `ImageState` tracks the uploaded
//! original and the latest revision.

#[cfg(test)]
mod proptests;
mod store;

pub use store::{Session, SessionId, SessionStore};

use crate::images;
use crate::llm::{ContentItem, OutputItem, RequestTurn, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please upload an image first.")]
    MissingImage,
}

/// Text turn replayed to the service on every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Text,
    Image,
}

/// Entry of the display log
///
/// `data` is literal text for `Text` entries and base64 image bytes for
/// `Image` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub role: Role,
    pub kind: EntryKind,
    pub data: String,
}

impl DisplayEntry {
    fn text(role: Role, data: impl Into<String>) -> Self {
        Self {
            role,
            kind: EntryKind::Text,
            data: data.into(),
        }
    }

    fn image(role: Role, data: impl Into<String>) -> Self {
        Self {
            role,
            kind: EntryKind::Image,
            data: data.into(),
        }
    }
}

/// Uploaded original and latest revision, both base64
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageState {
    pub original: Option<String>,
    pub current: Option<String>,
}

/// Result of an upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted,
    /// A session is already active; reset first to start over
    Ignored,
}

/// What one response added to the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedTurn {
    pub assistant_text: Option<String>,
    pub new_image: bool,
    /// Index of the first display entry appended by this turn
    pub first_entry: usize,
}

/// Owns the transcript, display log and image state of one session
#[derive(Debug, Default)]
pub struct ConversationManager {
    images: ImageState,
    transcript: Vec<Turn>,
    display: Vec<DisplayEntry>,
}

impl ConversationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active once an original image has been uploaded
    pub fn is_active(&self) -> bool {
        self.images.original.is_some()
    }

    #[cfg(test)]
    pub fn image_state(&self) -> &ImageState {
        &self.images
    }

    pub fn current_image(&self) -> Option<&str> {
        self.images.current.as_deref()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Return to the empty state
    pub fn reset(&mut self) {
        self.images = ImageState::default();
        self.transcript.clear();
        self.display.clear();
    }

    /// Anchor a fresh conversation on an uploaded image.
    ///
    /// Ignored while a session is active so an in-progress edit chain is not
    /// lost to a stray upload.
    pub fn ingest_upload(&mut self, raw_bytes: &[u8]) -> UploadOutcome {
        if self.is_active() {
            return UploadOutcome::Ignored;
        }

        let encoded = images::encode_b64(raw_bytes);
        self.images = ImageState {
            original: Some(encoded.clone()),
            current: Some(encoded),
        };
        self.transcript.clear();
        self.display.clear();
        UploadOutcome::Accepted
    }

    /// Full request payload: every past text turn, then the prompt with the
    /// current image attached.
    pub fn build_request(&self, prompt: &str) -> Result<Vec<RequestTurn>, SessionError> {
        let current = self.current_image().ok_or(SessionError::MissingImage)?;

        let mut turns: Vec<RequestTurn> = self
            .transcript
            .iter()
            .map(|turn| RequestTurn {
                role: turn.role,
                content: vec![ContentItem::text_for(turn.role, turn.text.as_str())],
            })
            .collect();

        turns.push(RequestTurn {
            role: Role::User,
            content: vec![
                ContentItem::InputText {
                    text: prompt.to_string(),
                },
                ContentItem::InputImage {
                    image_url: images::data_uri(current),
                },
            ],
        });

        Ok(turns)
    }

    /// Record a completed exchange.
    ///
    /// Call only with a fully received response; nothing here can fail, so
    /// an aborted request leaves the session untouched.
    pub fn apply_response(&mut self, prompt: &str, outputs: &[OutputItem]) -> AppliedTurn {
        let mut texts: Vec<&str> = Vec::new();
        let mut assistant_image: Option<&str> = None;

        for output in outputs {
            match output {
                OutputItem::Message { content } => {
                    texts.extend(
                        content
                            .iter()
                            .filter_map(|piece| piece.text.as_deref())
                            .filter(|text| !text.is_empty()),
                    );
                }
                // Last call wins, even when it carries no result
                OutputItem::ImageGenerationCall { result } => {
                    assistant_image = result.as_deref().filter(|r| !r.is_empty());
                }
                OutputItem::Unknown => {}
            }
        }

        let joined = texts.join("\n");
        let assistant_text = joined.trim();
        let first_entry = self.display.len();

        self.transcript.push(Turn {
            role: Role::User,
            text: prompt.to_string(),
        });
        self.display.push(DisplayEntry::text(Role::User, prompt));

        if !assistant_text.is_empty() {
            self.transcript.push(Turn {
                role: Role::Assistant,
                text: assistant_text.to_string(),
            });
            self.display
                .push(DisplayEntry::text(Role::Assistant, assistant_text));
        }

        if let Some(image) = assistant_image {
            self.display.push(DisplayEntry::image(Role::Assistant, image));
            self.images.current = Some(image.to_string());
        }

        tracing::debug!(
            transcript_len = self.transcript.len(),
            display_len = self.display.len(),
            has_text = !assistant_text.is_empty(),
            new_image = assistant_image.is_some(),
            "Applied response"
        );

        AppliedTurn {
            assistant_text: (!assistant_text.is_empty()).then(|| assistant_text.to_string()),
            new_image: assistant_image.is_some(),
            first_entry,
        }
    }

    /// Display log in order; restartable by calling again
    pub fn render_log(&self) -> impl Iterator<Item = &DisplayEntry> + '_ {
        self.display.iter()
    }
}
