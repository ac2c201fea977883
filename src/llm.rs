//! Remote image generation service
//!
//! One request per edit: the full text history plus the current image go
//! out, an ordered list of output items comes back.

mod azure;
mod error;
#[cfg(test)]
pub mod testing;
mod types;

pub use azure::AzureResponsesService;
pub use error::{LlmError, LlmErrorKind};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for image editing backends
#[async_trait]
pub trait ImageEditService: Send + Sync {
    /// Send the turns and wait for the complete output list
    async fn respond(&self, turns: &[RequestTurn]) -> Result<Vec<OutputItem>, LlmError>;

    /// Deployment or model identifier, for logs
    fn model_id(&self) -> &str;
}

/// Logging wrapper for image services
pub struct LoggingService {
    inner: Arc<dyn ImageEditService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn ImageEditService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ImageEditService for LoggingService {
    async fn respond(&self, turns: &[RequestTurn]) -> Result<Vec<OutputItem>, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.respond(turns).await;
        let duration = start.elapsed();

        match &result {
            Ok(outputs) => {
                let images = outputs
                    .iter()
                    .filter(|o| matches!(o, OutputItem::ImageGenerationCall { .. }))
                    .count();
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    turns = turns.len(),
                    outputs = outputs.len(),
                    images,
                    "Image edit request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    turns = turns.len(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Image edit request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
