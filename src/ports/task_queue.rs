//! Task queue port - Durable deferred work.
//!
//! Work that must outlive the request that scheduled it (notification fanout,
//! periodic sweeps, grant repair) goes through this port. Tasks are persisted
//! before the scheduling request returns, then drained by the background
//! worker.
//!
//! ## Delivery Semantics
//!
//! At-least-once. Tasks are claimed with row locks so concurrent workers never
//! double-claim, but a crash between execution and `mark_done` re-runs the
//! task. Task handlers must therefore be idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, DomainError, PaymentId};

/// Work item that can be queued for background execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task_type", rename_all = "snake_case")]
pub enum DeferredTask {
    /// Email every subscriber of a course about an update to it.
    CourseUpdateEmail { course_id: CourseId },

    /// Deactivate accounts idle longer than the configured window.
    InactivitySweep { inactive_days: u32 },

    /// Re-attempt an access grant that failed after settlement.
    RetryAccessGrant { payment_id: PaymentId },
}

impl DeferredTask {
    /// Stable name used for logging and storage.
    pub fn kind(&self) -> &'static str {
        match self {
            DeferredTask::CourseUpdateEmail { .. } => "course_update_email",
            DeferredTask::InactivitySweep { .. } => "inactivity_sweep",
            DeferredTask::RetryAccessGrant { .. } => "retry_access_grant",
        }
    }
}

/// A queued task as claimed by the worker.
#[derive(Debug, Clone)]
pub struct QueuedTask {
    /// Queue row ID.
    pub id: i64,

    /// The work to perform.
    pub task: DeferredTask,

    /// Number of times this task has been claimed, including this claim.
    pub attempts: u32,

    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,
}

/// Port for the durable deferred-task queue.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Persist a task for background execution.
    ///
    /// # Errors
    ///
    /// - `TaskQueueError` when the task could not be stored
    async fn enqueue(&self, task: &DeferredTask) -> Result<(), DomainError>;

    /// Claim up to `limit` pending tasks for execution.
    ///
    /// Claimed rows are locked against other workers until resolved.
    /// Each claim increments the task's attempt counter.
    async fn claim_pending(&self, limit: u32) -> Result<Vec<QueuedTask>, DomainError>;

    /// Mark a claimed task as completed.
    async fn mark_done(&self, id: i64) -> Result<(), DomainError>;

    /// Mark a claimed task as failed.
    ///
    /// Implementations return the task to the pending pool until its attempt
    /// budget is exhausted, then park it as permanently failed.
    async fn mark_failed(&self, id: i64, error: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CourseId;

    #[test]
    fn tasks_serialize_with_type_tag() {
        let task = DeferredTask::CourseUpdateEmail {
            course_id: CourseId::new(42),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"task_type\":\"course_update_email\""));
        assert!(json.contains("\"course_id\":42"));
    }

    #[test]
    fn tasks_round_trip_through_json() {
        let task = DeferredTask::RetryAccessGrant {
            payment_id: PaymentId::new(),
        };
        let json = serde_json::to_string(&task).unwrap();
        let back: DeferredTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(
            DeferredTask::InactivitySweep { inactive_days: 30 }.kind(),
            "inactivity_sweep"
        );
    }

    // Trait object safety test
    #[test]
    fn task_queue_is_object_safe() {
        fn _accepts_dyn(_queue: &dyn TaskQueue) {}
    }
}
