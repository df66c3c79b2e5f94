use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Delivery status of a message task.
///
/// Moves forward only: `Pending -> InProgress -> {Succeeded, Failed}`, with
/// `Pending` allowed to jump straight to a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        }
    }

    /// Succeeded and Failed admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }

    /// Statuses a task must currently hold for a transition into `self` to apply.
    ///
    /// Empty for `Pending`: nothing may move back into it.
    pub fn predecessors(self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Pending => &[],
            TaskStatus::InProgress => &[TaskStatus::Pending],
            TaskStatus::Succeeded | TaskStatus::Failed => {
                &[TaskStatus::Pending, TaskStatus::InProgress]
            }
        }
    }

    pub fn can_follow(self, current: TaskStatus) -> bool {
        self.predecessors().contains(&current)
    }

    /// Entering this status claims the task, so it also needs Enabled visibility.
    pub fn requires_enabled(self) -> bool {
        self == TaskStatus::InProgress
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soft enable/disable flag, orthogonal to [`TaskStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Enabled,
    Disabled,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Enabled => "enabled",
            Visibility::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound notification task.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MessageTask {
    pub id: i64,
    pub recipient_id: i64,
    pub instance_id: i64,
    #[sqlx(rename = "user_name")]
    pub user: String,
    pub subject: String,
    pub body: String,
    pub is_priority: bool,
    pub visibility: Visibility,
    pub status: TaskStatus,
    /// Stamped by every applied status transition (epoch seconds on the wire).
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Opaque delivery receipt or error detail owned by the dispatcher.
    #[serde(serialize_with = "serialize_result")]
    pub result: Option<Vec<u8>>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl MessageTask {
    /// Eligible for a delivery attempt.
    pub fn is_claimable(&self) -> bool {
        self.visibility == Visibility::Enabled && self.status == TaskStatus::Pending
    }
}

/// Payloads are uninterpreted bytes; render them as lossy UTF-8 for humans.
fn serialize_result<S: Serializer>(result: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match result {
        Some(bytes) => s.serialize_some(&String::from_utf8_lossy(bytes)),
        None => s.serialize_none(),
    }
}

/// Parameters for creating a new message task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMessageTask {
    pub recipient_id: i64,
    pub instance_id: i64,
    pub user: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub is_priority: bool,
}

/// Outcome of a status-recording call.
///
/// `Conflict` is the lost-race signal for concurrent dispatchers, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusTransition {
    /// The conditional write changed the task.
    Applied,
    /// The task already holds the requested terminal status; nothing written.
    AlreadyRecorded,
    /// The task's current status does not admit the requested one; nothing written.
    Conflict { current: TaskStatus },
}

impl StatusTransition {
    /// Resolve a conditional write that matched no row, given the status the task holds now.
    pub fn from_unmatched(requested: TaskStatus, current: TaskStatus) -> Self {
        if requested.is_terminal() && requested == current {
            StatusTransition::AlreadyRecorded
        } else {
            StatusTransition::Conflict { current }
        }
    }

    pub fn is_applied(self) -> bool {
        matches!(self, StatusTransition::Applied)
    }
}
