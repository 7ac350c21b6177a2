//! PostgreSQL implementation of TaskQueue.
//!
//! The `deferred_tasks` table is the queue. Claiming is a single statement:
//! a CTE selects claimable rows with `FOR UPDATE SKIP LOCKED` (concurrent
//! workers skip each other's rows instead of blocking) and the outer UPDATE
//! marks them running while incrementing the attempt counter.
//!
//! A worker crash leaves its rows in `running`; they become claimable again
//! once their claim is older than the stale window, which is what delivers
//! at-least-once execution. Rows that exhaust the attempt budget stop being
//! claimed and are parked as `failed` by `mark_failed`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{DeferredTask, QueuedTask, TaskQueue};

/// PostgreSQL implementation of the TaskQueue port.
pub struct PostgresTaskQueue {
    pool: PgPool,
    max_attempts: u32,
}

impl PostgresTaskQueue {
    /// Creates a new PostgresTaskQueue.
    ///
    /// `max_attempts` caps how often a failing task is retried before it is
    /// parked as permanently failed.
    pub fn new(pool: PgPool, max_attempts: u32) -> Self {
        Self { pool, max_attempts }
    }
}

/// Database row representation of a claimed task.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    payload: serde_json::Value,
    attempts: i32,
    enqueued_at: DateTime<Utc>,
}

/// Decode a claimed row, dropping rows whose payload no longer parses.
///
/// An undecodable payload (schema drift, manual edits) is logged and
/// skipped; its attempt counter keeps rising on each claim until the
/// budget excludes it from claiming entirely.
fn row_to_task(row: TaskRow) -> Option<QueuedTask> {
    match serde_json::from_value::<DeferredTask>(row.payload) {
        Ok(task) => Some(QueuedTask {
            id: row.id,
            task,
            attempts: row.attempts.max(0) as u32,
            created_at: row.enqueued_at,
        }),
        Err(e) => {
            tracing::error!(
                task_id = row.id,
                error = %e,
                "Dropping task with undecodable payload"
            );
            None
        }
    }
}

#[async_trait]
impl TaskQueue for PostgresTaskQueue {
    async fn enqueue(&self, task: &DeferredTask) -> Result<(), DomainError> {
        let payload = serde_json::to_value(task).map_err(|e| {
            DomainError::new(
                ErrorCode::TaskQueueError,
                format!("Failed to serialize task: {}", e),
            )
        })?;

        sqlx::query(
            r#"
            INSERT INTO deferred_tasks (payload, status, attempts, enqueued_at)
            VALUES ($1, 'pending', 0, NOW())
            "#,
        )
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::TaskQueueError,
                format!("Failed to enqueue task: {}", e),
            )
        })?;

        tracing::debug!(task_kind = task.kind(), "Task enqueued");

        Ok(())
    }

    async fn claim_pending(&self, limit: u32) -> Result<Vec<QueuedTask>, DomainError> {
        // Stale `running` rows (worker died mid-task) become claimable
        // again after ten minutes.
        let rows: Vec<TaskRow> = sqlx::query_as(
            r#"
            WITH claimable AS (
                SELECT id
                FROM deferred_tasks
                WHERE attempts < $2
                  AND (
                    status = 'pending'
                    OR (status = 'running' AND claimed_at < NOW() - INTERVAL '10 minutes')
                  )
                ORDER BY id
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE deferred_tasks t
            SET status = 'running', attempts = t.attempts + 1, claimed_at = NOW()
            FROM claimable c
            WHERE t.id = c.id
            RETURNING t.id, t.payload, t.attempts, t.enqueued_at
            "#,
        )
        .bind(i64::from(limit))
        .bind(self.max_attempts as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::TaskQueueError,
                format!("Failed to claim tasks: {}", e),
            )
        })?;

        Ok(rows.into_iter().filter_map(row_to_task).collect())
    }

    async fn mark_done(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE deferred_tasks
            SET status = 'done', processed_at = NOW(), last_error = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::TaskQueueError,
                format!("Failed to mark task done: {}", e),
            )
        })?;

        Ok(())
    }

    async fn mark_failed(&self, id: i64, error: &str) -> Result<(), DomainError> {
        // Attempts were incremented at claim time, so a task at the budget
        // is parked; below it, it returns to the pending pool.
        sqlx::query(
            r#"
            UPDATE deferred_tasks
            SET status = CASE WHEN attempts >= $3 THEN 'failed' ELSE 'pending' END,
                processed_at = CASE WHEN attempts >= $3 THEN NOW() ELSE NULL END,
                last_error = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(self.max_attempts as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::TaskQueueError,
                format!("Failed to mark task failed: {}", e),
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CourseId;

    #[test]
    fn row_to_task_decodes_payload() {
        let row = TaskRow {
            id: 7,
            payload: serde_json::json!({"task_type": "course_update_email", "course_id": 42}),
            attempts: 1,
            enqueued_at: Utc::now(),
        };

        let queued = row_to_task(row).unwrap();
        assert_eq!(queued.id, 7);
        assert_eq!(queued.attempts, 1);
        assert_eq!(
            queued.task,
            DeferredTask::CourseUpdateEmail {
                course_id: CourseId::new(42)
            }
        );
    }

    #[test]
    fn row_to_task_drops_undecodable_payload() {
        let row = TaskRow {
            id: 8,
            payload: serde_json::json!({"task_type": "mystery"}),
            attempts: 3,
            enqueued_at: Utc::now(),
        };

        assert!(row_to_task(row).is_none());
    }

    #[test]
    fn row_to_task_clamps_negative_attempts() {
        let row = TaskRow {
            id: 9,
            payload: serde_json::json!({"task_type": "inactivity_sweep", "inactive_days": 30}),
            attempts: -1,
            enqueued_at: Utc::now(),
        };

        assert_eq!(row_to_task(row).unwrap().attempts, 0);
    }
}
