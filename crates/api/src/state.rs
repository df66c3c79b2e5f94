//! Shared application state for the Axum API server.

use std::sync::Arc;

use courier_common::config::AppConfig;
use courier_queue::{MessageTaskQueue, MessageTaskRepository};

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub queue: MessageTaskQueue<dyn MessageTaskRepository>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: Arc<dyn MessageTaskRepository>, config: AppConfig) -> Self {
        Self {
            queue: MessageTaskQueue::new(repo),
            config,
        }
    }
}
