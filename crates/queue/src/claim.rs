//! Claim view: the bounded, ordered read a dispatcher polls.
//!
//! Ordering is `is_priority` descending, then `id` ascending, so priority
//! tasks are never starved behind a normal backlog and each tier stays FIFO.
//! The ordering only holds within a single call.

use std::sync::Arc;

use courier_common::error::AppError;
use courier_common::types::MessageTask;

use crate::repository::MessageTaskRepository;

pub struct ClaimView<S: ?Sized> {
    repo: Arc<S>,
}

impl<S: ?Sized> Clone for ClaimView<S> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<S: MessageTaskRepository + ?Sized> ClaimView<S> {
    pub fn new(repo: Arc<S>) -> Self {
        Self { repo }
    }

    /// Up to `limit` Enabled + Pending tasks. A read-only snapshot, not a claim.
    ///
    /// `limit <= 0` returns an empty batch without touching storage.
    pub async fn list_pending(&self, limit: i64) -> Result<Vec<MessageTask>, AppError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let tasks = self.repo.list_claimable(limit).await?;
        tracing::debug!(limit, returned = tasks.len(), "Listed pending message tasks");
        Ok(tasks)
    }
}
