//! In-process repository for tests and single-node development runs.
//!
//! A single async mutex serialises every operation, which gives the same
//! compare-and-swap semantics as the conditional UPDATE in Postgres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use courier_common::error::AppError;
use courier_common::types::{MessageTask, NewMessageTask, StatusTransition, TaskStatus, Visibility};

use crate::repository::MessageTaskRepository;

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    tasks: BTreeMap<i64, MessageTask>,
}

#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    state: Mutex<MemoryState>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw lookup regardless of visibility.
    pub async fn get(&self, id: i64) -> Option<MessageTask> {
        self.state.lock().await.tasks.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageTaskRepository for MemoryTaskRepository {
    async fn insert(&self, task: &NewMessageTask) -> Result<i64, AppError> {
        let mut state = self.state.lock().await;
        state.last_id += 1;
        let id = state.last_id;

        state.tasks.insert(
            id,
            MessageTask {
                id,
                recipient_id: task.recipient_id,
                instance_id: task.instance_id,
                user: task.user.clone(),
                subject: task.subject.clone(),
                body: task.body.clone(),
                is_priority: task.is_priority,
                visibility: Visibility::Enabled,
                status: TaskStatus::Pending,
                completed_at: None,
                result: None,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn find_enabled(&self, id: i64) -> Result<Option<MessageTask>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .tasks
            .get(&id)
            .filter(|t| t.visibility == Visibility::Enabled)
            .cloned())
    }

    async fn set_visibility(&self, id: i64, visibility: Visibility) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::task_not_found(id))?;
        task.visibility = visibility;
        Ok(())
    }

    async fn list_claimable(&self, limit: i64) -> Result<Vec<MessageTask>, AppError> {
        let state = self.state.lock().await;
        let limit = usize::try_from(limit).unwrap_or(0);

        // BTreeMap iterates in id order, so a stable partition keeps FIFO per tier.
        let (priority, normal): (Vec<&MessageTask>, Vec<&MessageTask>) = state
            .tasks
            .values()
            .filter(|t| t.is_claimable())
            .partition(|t| t.is_priority);

        Ok(priority
            .into_iter()
            .chain(normal)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn transition_status(
        &self,
        id: i64,
        status: TaskStatus,
        result: Option<&[u8]>,
        at: DateTime<Utc>,
    ) -> Result<StatusTransition, AppError> {
        let mut state = self.state.lock().await;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::task_not_found(id))?;

        let hidden = status.requires_enabled() && task.visibility != Visibility::Enabled;
        if hidden || !status.can_follow(task.status) {
            return Ok(StatusTransition::from_unmatched(status, task.status));
        }

        task.status = status;
        task.completed_at = Some(at);
        if let Some(result) = result {
            task.result = Some(result.to_vec());
        }
        Ok(StatusTransition::Applied)
    }
}
