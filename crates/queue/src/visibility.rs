//! Visibility gate: soft enable/disable of a task.
//!
//! Flipping visibility never touches `status`, `completed_at` or `result`; a
//! disabled task keeps whatever delivery status it had and is simply hidden
//! from lookups and the claim view.

use std::sync::Arc;

use courier_common::error::AppError;
use courier_common::types::Visibility;

use crate::repository::MessageTaskRepository;

pub struct VisibilityGate<S: ?Sized> {
    repo: Arc<S>,
}

impl<S: ?Sized> Clone for VisibilityGate<S> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<S: MessageTaskRepository + ?Sized> VisibilityGate<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }

    /// Idempotent: enabling an enabled task succeeds without change.
    pub async fn enable(&self, id: i64) -> Result<(), AppError> {
        self.set(id, Visibility::Enabled).await
    }

    /// Idempotent: disabling a disabled task succeeds without change.
    pub async fn disable(&self, id: i64) -> Result<(), AppError> {
        self.set(id, Visibility::Disabled).await
    }

    async fn set(&self, id: i64, visibility: Visibility) -> Result<(), AppError> {
        AppError::check_task_id(id)?;
        self.repo.set_visibility(id, visibility).await?;

        tracing::debug!(task_id = id, visibility = %visibility, "Message task visibility set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use courier_common::types::TaskStatus;

    use crate::test_support::{memory_queue, new_task};

    use super::*;

    #[tokio::test]
    async fn test_enable_disable_are_idempotent() {
        let (repo, queue) = memory_queue();
        let id = queue.tasks().create(&new_task("a", false)).await.unwrap();

        queue.visibility().disable(id).await.unwrap();
        queue.visibility().disable(id).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().visibility, Visibility::Disabled);

        queue.visibility().enable(id).await.unwrap();
        queue.visibility().enable(id).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().visibility, Visibility::Enabled);
    }

    #[tokio::test]
    async fn test_toggle_preserves_delivery_fields() {
        let (repo, queue) = memory_queue();
        let id = queue.tasks().create(&new_task("a", false)).await.unwrap();
        queue
            .recorder()
            .record_status(id, TaskStatus::Succeeded, b"OK")
            .await
            .unwrap();
        let before = repo.get(id).await.unwrap();

        queue.visibility().disable(id).await.unwrap();
        let disabled = repo.get(id).await.unwrap();
        assert_eq!(disabled.status, before.status);
        assert_eq!(disabled.completed_at, before.completed_at);
        assert_eq!(disabled.result, before.result);

        queue.visibility().enable(id).await.unwrap();
        let enabled = repo.get(id).await.unwrap();
        assert_eq!(enabled.status, TaskStatus::Succeeded);
        assert_eq!(enabled.completed_at, before.completed_at);
        assert_eq!(enabled.result.as_deref(), Some(&b"OK"[..]));
    }

    #[tokio::test]
    async fn test_toggle_unknown_task_fails() {
        let (_, queue) = memory_queue();
        assert!(matches!(
            queue.visibility().enable(11).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            queue.visibility().disable(11).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_toggle_rejects_non_positive_id() {
        let (_, queue) = memory_queue();
        assert!(matches!(
            queue.visibility().disable(0).await,
            Err(AppError::InvalidArgument(_))
        ));
    }
}
