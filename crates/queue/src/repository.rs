//! Storage port behind every queue component.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use courier_common::error::AppError;
use courier_common::types::{MessageTask, NewMessageTask, StatusTransition, TaskStatus, Visibility};

/// Persistence seam for message tasks.
///
/// Each method is one atomic unit: implementations must either apply the whole
/// operation or nothing. Argument validation happens in the components, so
/// implementations may assume positive ids and positive limits.
#[async_trait]
pub trait MessageTaskRepository: Send + Sync {
    /// Insert a Pending + Enabled task and return its new id.
    async fn insert(&self, task: &NewMessageTask) -> Result<i64, AppError>;

    /// Fetch a task only when its visibility is Enabled.
    async fn find_enabled(&self, id: i64) -> Result<Option<MessageTask>, AppError>;

    /// Set visibility. Fails with `NotFound` when the task does not exist.
    async fn set_visibility(&self, id: i64, visibility: Visibility) -> Result<(), AppError>;

    /// Enabled + Pending tasks, `is_priority` descending then `id` ascending.
    async fn list_claimable(&self, limit: i64) -> Result<Vec<MessageTask>, AppError>;

    /// Move a task into `status` if its current status admits it.
    ///
    /// On success stamps `completed_at = at` and replaces `result` when one is
    /// given. Fails with `NotFound` when the task does not exist.
    async fn transition_status(
        &self,
        id: i64,
        status: TaskStatus,
        result: Option<&[u8]>,
        at: DateTime<Utc>,
    ) -> Result<StatusTransition, AppError>;
}
