//! Polling dispatcher: the reference consumer of the message task queue.
//!
//! Each cycle:
//! 1. Reads a batch from the claim view
//! 2. Soft-claims every task (conditional write, losers skip the task)
//! 3. Delivers claimed tasks through the configured [`Deliverer`]
//! 4. Records `Succeeded` with the receipt or `Failed` with the error detail
//!
//! Any number of dispatchers may poll the same store concurrently.

use std::time::Duration;

use courier_common::error::AppError;
use courier_common::types::{MessageTask, StatusTransition, TaskStatus};
use courier_queue::{MessageTaskQueue, MessageTaskRepository};

use crate::deliverer::Deliverer;

/// Attempts made to write a terminal status before giving up on it.
const RECORD_ATTEMPTS: u32 = 3;
/// Base delay between terminal write attempts; grows linearly per attempt.
const RECORD_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Per-cycle counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub polled: usize,
    /// Claims lost to another dispatcher, plus outcomes superseded by another writer.
    pub lost: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Delivered tasks whose terminal status could not be written.
    pub unrecorded: usize,
}

impl DispatchStats {
    pub fn delivered(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Where a delivery outcome ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Recorded(TaskStatus),
    Superseded,
    Unrecorded,
}

pub struct Dispatcher<S: ?Sized, D> {
    queue: MessageTaskQueue<S>,
    deliverer: D,
    batch_size: i64,
    poll_interval: Duration,
}

impl<S, D> Dispatcher<S, D>
where
    S: MessageTaskRepository + ?Sized,
    D: Deliverer,
{
    pub fn new(
        queue: MessageTaskQueue<S>,
        deliverer: D,
        batch_size: i64,
        poll_interval_ms: u64,
    ) -> Self {
        Self {
            queue,
            deliverer,
            batch_size,
            poll_interval: Duration::from_millis(poll_interval_ms),
        }
    }

    /// Poll until the surrounding task is cancelled. Never returns on its own.
    ///
    /// Storage errors are logged and retried after one poll interval.
    pub async fn run(&self) {
        tracing::info!(
            batch_size = self.batch_size,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Dispatcher started"
        );

        loop {
            match self.run_once().await {
                Ok(stats) if stats.polled > 0 => {
                    tracing::info!(
                        polled = stats.polled,
                        lost = stats.lost,
                        succeeded = stats.succeeded,
                        failed = stats.failed,
                        unrecorded = stats.unrecorded,
                        "Dispatch cycle complete"
                    );
                    // A full batch suggests more work is waiting.
                    if (stats.polled as i64) < self.batch_size {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
                Ok(_) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    tracing::error!(error = %e, "Dispatch cycle failed, backing off");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Run a single poll → claim → deliver → record cycle.
    ///
    /// A failed listing or claim aborts the cycle; a failed terminal write
    /// only affects its own task.
    pub async fn run_once(&self) -> Result<DispatchStats, AppError> {
        let batch = self.queue.claims().list_pending(self.batch_size).await?;
        let mut stats = DispatchStats {
            polled: batch.len(),
            ..Default::default()
        };

        for task in &batch {
            if !self.queue.recorder().claim(task.id).await? {
                tracing::debug!(task_id = task.id, "Claim lost to another dispatcher");
                stats.lost += 1;
                continue;
            }

            match self.deliver(task).await {
                Outcome::Recorded(TaskStatus::Succeeded) => stats.succeeded += 1,
                Outcome::Recorded(_) => stats.failed += 1,
                Outcome::Superseded => stats.lost += 1,
                Outcome::Unrecorded => stats.unrecorded += 1,
            }
        }

        Ok(stats)
    }

    /// Deliver a claimed task and record the terminal status it ended in.
    async fn deliver(&self, task: &MessageTask) -> Outcome {
        let (status, result) = match self.deliverer.deliver(task).await {
            Ok(receipt) => (TaskStatus::Succeeded, receipt),
            Err(e) => {
                tracing::warn!(task_id = task.id, error = %e, "Message task delivery failed");
                (TaskStatus::Failed, e.to_string().into_bytes())
            }
        };

        self.record_outcome(task.id, status, &result).await
    }

    /// Write the terminal status, retrying storage errors with the same
    /// status and result. A retry that lands after an earlier attempt did
    /// commit comes back as `AlreadyRecorded`.
    async fn record_outcome(&self, id: i64, status: TaskStatus, result: &[u8]) -> Outcome {
        let mut attempt: u32 = 1;
        loop {
            match self.queue.recorder().record_status(id, status, result).await {
                Ok(StatusTransition::Applied | StatusTransition::AlreadyRecorded) => {
                    return Outcome::Recorded(status);
                }
                Ok(StatusTransition::Conflict { current }) => {
                    tracing::warn!(
                        task_id = id,
                        recorded = %status,
                        current = %current,
                        "Outcome not recorded, task status changed underneath the dispatcher"
                    );
                    return Outcome::Superseded;
                }
                Err(AppError::Storage(e)) if attempt < RECORD_ATTEMPTS => {
                    tracing::warn!(
                        task_id = id,
                        attempt,
                        error = %e,
                        "Recording outcome failed, retrying"
                    );
                    tokio::time::sleep(RECORD_RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        task_id = id,
                        status = %status,
                        result = %String::from_utf8_lossy(result),
                        attempts = attempt,
                        error = %e,
                        "Outcome could not be recorded, task left in progress"
                    );
                    return Outcome::Unrecorded;
                }
            }
        }
    }
}
