//! Status recorder: the single mutation path for delivery outcome.
//!
//! A dispatcher calls it at least twice per task: once with `InProgress` to
//! soft-claim, once with `Succeeded`/`Failed` to finalise. Each call is a
//! compare-and-swap on `status`, so two dispatchers that listed the same task
//! cannot both win the claim.
//!
//! `completed_at` is stamped on every applied transition, including the soft
//! claim; after finalisation it holds the terminal transition time.

use std::sync::Arc;

use chrono::Utc;

use courier_common::error::AppError;
use courier_common::types::{StatusTransition, TaskStatus};

use crate::repository::MessageTaskRepository;

pub struct StatusRecorder<S: ?Sized> {
    repo: Arc<S>,
}

impl<S: ?Sized> Clone for StatusRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<S: MessageTaskRepository + ?Sized> StatusRecorder<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }

    /// Advance a task to `status`, replacing its result only when `result` is non-empty.
    ///
    /// Returns `Conflict` (not an error) when the task's current status does not
    /// admit `status`, and `AlreadyRecorded` for a retried terminal write.
    pub async fn record_status(
        &self,
        id: i64,
        status: TaskStatus,
        result: &[u8],
    ) -> Result<StatusTransition, AppError> {
        AppError::check_task_id(id)?;
        if status == TaskStatus::Pending {
            return Err(AppError::InvalidArgument(
                "a task cannot be moved back to pending".to_string(),
            ));
        }

        let payload = (!result.is_empty()).then_some(result);
        let transition = self
            .repo
            .transition_status(id, status, payload, Utc::now())
            .await?;

        tracing::debug!(
            task_id = id,
            status = %status,
            ?transition,
            "Message task status recorded"
        );

        Ok(transition)
    }

    /// Soft-claim a Pending, Enabled task. `false` means another dispatcher won
    /// it or the task was disabled after it was listed.
    pub async fn claim(&self, id: i64) -> Result<bool, AppError> {
        let transition = self.record_status(id, TaskStatus::InProgress, &[]).await?;
        Ok(transition.is_applied())
    }
}
