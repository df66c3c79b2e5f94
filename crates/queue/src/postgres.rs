//! PostgreSQL-backed message task storage.
//!
//! [`MessageTaskDao`] runs each operation against a caller-supplied connection,
//! so a producer can fold task writes into its own transaction
//! (`MessageTaskDao::create(&mut tx, ..)`). [`PgTaskRepository`] wraps every call
//! in a transaction of its own when the caller has none.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use courier_common::error::AppError;
use courier_common::types::{MessageTask, NewMessageTask, StatusTransition, TaskStatus, Visibility};

use crate::repository::MessageTaskRepository;

/// Data access for the `message_tasks` table.
pub struct MessageTaskDao;

impl MessageTaskDao {
    /// Insert a new task (Pending, Enabled) and return its id.
    pub async fn create(conn: &mut PgConnection, task: &NewMessageTask) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO message_tasks
                (recipient_id, instance_id, user_name, subject, body, is_priority, visibility, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(task.recipient_id)
        .bind(task.instance_id)
        .bind(&task.user)
        .bind(&task.subject)
        .bind(&task.body)
        .bind(task.is_priority)
        .bind(Visibility::Enabled.as_str())
        .bind(TaskStatus::Pending.as_str())
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    pub async fn find_enabled(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<MessageTask>, AppError> {
        let task: Option<MessageTask> =
            sqlx::query_as("SELECT * FROM message_tasks WHERE id = $1 AND visibility = $2")
                .bind(id)
                .bind(Visibility::Enabled.as_str())
                .fetch_optional(&mut *conn)
                .await?;

        Ok(task)
    }

    /// Flip visibility. Postgres counts matched rows, so repeating a flip still
    /// affects one row and only a missing id yields zero.
    pub async fn set_visibility(
        conn: &mut PgConnection,
        id: i64,
        visibility: Visibility,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE message_tasks SET visibility = $1 WHERE id = $2")
            .bind(visibility.as_str())
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::task_not_found(id));
        }
        Ok(())
    }

    pub async fn list_claimable(
        conn: &mut PgConnection,
        limit: i64,
    ) -> Result<Vec<MessageTask>, AppError> {
        let tasks: Vec<MessageTask> = sqlx::query_as(
            r#"
            SELECT *
            FROM message_tasks
            WHERE visibility = $1
              AND status = $2
            ORDER BY is_priority DESC, id ASC
            LIMIT $3
            "#,
        )
        .bind(Visibility::Enabled.as_str())
        .bind(TaskStatus::Pending.as_str())
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(tasks)
    }

    /// Compare-and-swap on `status`: the update only matches while the task
    /// holds one of `status.predecessors()`. A claim (`InProgress`) also
    /// requires the task to be Enabled at write time.
    pub async fn transition_status(
        conn: &mut PgConnection,
        id: i64,
        status: TaskStatus,
        result: Option<&[u8]>,
        at: DateTime<Utc>,
    ) -> Result<StatusTransition, AppError> {
        let allowed: Vec<&str> = status
            .predecessors()
            .iter()
            .map(|s| s.as_str())
            .collect();
        let required_visibility = status
            .requires_enabled()
            .then_some(Visibility::Enabled.as_str());

        let updated = sqlx::query(
            r#"
            UPDATE message_tasks
            SET status = $1,
                completed_at = $2,
                result = COALESCE($3, result)
            WHERE id = $4
              AND status = ANY($5)
              AND ($6::TEXT IS NULL OR visibility = $6)
            "#,
        )
        .bind(status.as_str())
        .bind(at)
        .bind(result)
        .bind(id)
        .bind(&allowed)
        .bind(required_visibility)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() > 0 {
            return Ok(StatusTransition::Applied);
        }

        let current: Option<TaskStatus> =
            sqlx::query_scalar("SELECT status FROM message_tasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        match current {
            Some(current) => Ok(StatusTransition::from_unmatched(status, current)),
            None => Err(AppError::task_not_found(id)),
        }
    }
}

/// Pool-backed repository; every call runs in its own transaction.
#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MessageTaskRepository for PgTaskRepository {
    async fn insert(&self, task: &NewMessageTask) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;
        let id = MessageTaskDao::create(&mut tx, task).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn find_enabled(&self, id: i64) -> Result<Option<MessageTask>, AppError> {
        let mut conn = self.pool.acquire().await?;
        MessageTaskDao::find_enabled(&mut conn, id).await
    }

    async fn set_visibility(&self, id: i64, visibility: Visibility) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        MessageTaskDao::set_visibility(&mut tx, id, visibility).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_claimable(&self, limit: i64) -> Result<Vec<MessageTask>, AppError> {
        let mut conn = self.pool.acquire().await?;
        MessageTaskDao::list_claimable(&mut conn, limit).await
    }

    async fn transition_status(
        &self,
        id: i64,
        status: TaskStatus,
        result: Option<&[u8]>,
        at: DateTime<Utc>,
    ) -> Result<StatusTransition, AppError> {
        let mut tx = self.pool.begin().await?;
        let transition = MessageTaskDao::transition_status(&mut tx, id, status, result, at).await?;
        tx.commit().await?;
        Ok(transition)
    }
}
