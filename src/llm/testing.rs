//! Mock image service for handler tests

use super::{ImageEditService, LlmError, OutputItem, RequestTurn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns queued results in order and records every request
pub struct MockImageService {
    responses: Mutex<VecDeque<Result<Vec<OutputItem>, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<Vec<RequestTurn>>>,
}

impl MockImageService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, outputs: Vec<OutputItem>) {
        self.responses.lock().unwrap().push_back(Ok(outputs));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<Vec<RequestTurn>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageEditService for MockImageService {
    async fn respond(&self, turns: &[RequestTurn]) -> Result<Vec<OutputItem>, LlmError> {
        self.requests.lock().unwrap().push(turns.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-image-model"
    }
}
