//! Message task routes: creation, lookup, visibility and status recording.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use courier_common::error::AppError;
use courier_common::types::{MessageTask, NewMessageTask, StatusTransition, TaskStatus, Visibility};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/message-tasks", post(create_task))
        .route("/api/message-tasks/pending", get(list_pending))
        .route("/api/message-tasks/{id}", get(get_task))
        .route("/api/message-tasks/{id}/enable", post(enable_task))
        .route("/api/message-tasks/{id}/disable", post(disable_task))
        .route("/api/message-tasks/{id}/status", post(record_status))
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    pub id: i64,
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// Defaults to the configured dispatcher batch size.
    pub limit: Option<i64>,
}

/// Request body for recording a delivery status.
#[derive(Debug, Deserialize)]
pub struct RecordStatusRequest {
    pub status: TaskStatus,
    /// Stored as its UTF-8 bytes; empty leaves the previous result untouched.
    /// JSON strings cannot carry arbitrary bytes, so binary results must go
    /// through [`StatusRecorder`](courier_queue::StatusRecorder) directly.
    #[serde(default)]
    pub result: String,
}

/// POST /api/message-tasks — Enqueue a new message task.
async fn create_task(
    State(state): State<AppState>,
    Json(params): Json<NewMessageTask>,
) -> Result<Json<CreatedResponse>, AppError> {
    let id = state.queue.tasks().create(&params).await?;

    tracing::info!(
        task_id = id,
        recipient_id = params.recipient_id,
        is_priority = params.is_priority,
        "Message task enqueued"
    );

    Ok(Json(CreatedResponse { id }))
}

/// GET /api/message-tasks/pending?limit=N — Claimable tasks in dispatch order.
async fn list_pending(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<MessageTask>>, AppError> {
    let limit = query.limit.unwrap_or(state.config.dispatcher_batch_size);
    let tasks = state.queue.claims().list_pending(limit).await?;
    Ok(Json(tasks))
}

/// GET /api/message-tasks/:id — Fetch an enabled task.
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageTask>, AppError> {
    let task = state.queue.tasks().find_visible(id).await?;
    Ok(Json(task))
}

/// POST /api/message-tasks/:id/enable
async fn enable_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VisibilityResponse>, AppError> {
    state.queue.visibility().enable(id).await?;
    tracing::info!(task_id = id, "Message task enabled");

    Ok(Json(VisibilityResponse {
        id,
        visibility: Visibility::Enabled,
    }))
}

/// POST /api/message-tasks/:id/disable
async fn disable_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VisibilityResponse>, AppError> {
    state.queue.visibility().disable(id).await?;
    tracing::info!(task_id = id, "Message task disabled");

    Ok(Json(VisibilityResponse {
        id,
        visibility: Visibility::Disabled,
    }))
}

/// POST /api/message-tasks/:id/status — Soft-claim or finalise a task.
///
/// A lost claim comes back as `{"outcome": "conflict", ...}` with 200, since
/// losing a race is an expected result rather than a failure. The `result`
/// field is text only; non-UTF-8 payloads are not accepted over HTTP.
async fn record_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RecordStatusRequest>,
) -> Result<Json<StatusTransition>, AppError> {
    let transition = state
        .queue
        .recorder()
        .record_status(id, req.status, req.result.as_bytes())
        .await?;
    Ok(Json(transition))
}
