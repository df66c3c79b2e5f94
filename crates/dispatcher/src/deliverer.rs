//! Delivery seam between the dispatcher and the actual sending channel.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use courier_common::types::MessageTask;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel refused the message; retrying the same payload will not help.
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    #[error("Delivery transport error: {0}")]
    Transport(String),
}

/// Sends one claimed task through its delivery instance.
///
/// The returned bytes are stored verbatim as the task's result.
#[async_trait]
pub trait Deliverer: Send + Sync {
    async fn deliver(&self, task: &MessageTask) -> Result<Vec<u8>, DeliveryError>;
}

/// Deliverer that only emits a structured log line and a JSON receipt.
///
/// Useful for dry runs; real channels live outside this repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDeliverer;

#[async_trait]
impl Deliverer for LogDeliverer {
    async fn deliver(&self, task: &MessageTask) -> Result<Vec<u8>, DeliveryError> {
        tracing::info!(
            task_id = task.id,
            recipient_id = task.recipient_id,
            instance_id = task.instance_id,
            subject = %task.subject,
            is_priority = task.is_priority,
            "Delivering message task"
        );

        let receipt = json!({
            "channel": "log",
            "task_id": task.id,
            "delivered_at": Utc::now().timestamp(),
        });
        serde_json::to_vec(&receipt).map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}
