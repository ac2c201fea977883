//! HTTP API for the image editor
//!
//! Serves the editor page and the JSON endpoints it drives.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::llm::ImageEditService;
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub service: Arc<dyn ImageEditService>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionStore>, service: Arc<dyn ImageEditService>) -> Self {
        Self { sessions, service }
    }
}
