//! Task store: creation and point lookup of message tasks.

use std::sync::Arc;

use courier_common::error::AppError;
use courier_common::types::{MessageTask, NewMessageTask};

use crate::repository::MessageTaskRepository;

pub struct TaskStore<S: ?Sized> {
    repo: Arc<S>,
}

impl<S: ?Sized> Clone for TaskStore<S> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<S: MessageTaskRepository + ?Sized> TaskStore<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }

    /// Create a new task in the Pending status with Enabled visibility.
    pub async fn create(&self, task: &NewMessageTask) -> Result<i64, AppError> {
        let id = self.repo.insert(task).await?;

        tracing::debug!(
            task_id = id,
            recipient_id = task.recipient_id,
            instance_id = task.instance_id,
            is_priority = task.is_priority,
            "Message task created"
        );

        Ok(id)
    }

    /// Look up a task if it is Enabled, whatever its delivery status.
    pub async fn find_visible(&self, id: i64) -> Result<MessageTask, AppError> {
        if id <= 0 {
            return Err(AppError::task_not_found(id));
        }

        self.repo
            .find_enabled(id)
            .await?
            .ok_or_else(|| AppError::task_not_found(id))
    }
}
