//! TaskWorker - Background executor for queued deferred work.
//!
//! Drains the durable task queue on an interval: claims a batch of pending
//! tasks, executes each one, and resolves the row as done or failed. Failed
//! tasks return to the pending pool until their attempt budget runs out.
//!
//! The queue delivers at-least-once, so every task handler here tolerates
//! re-execution: grant repair re-checks payment state before granting, the
//! inactivity sweep is a pure cutoff query, and a re-sent course update
//! email is annoying but harmless.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let worker = TaskWorker::new(
//!     queue, catalog, subscriptions, mailer,
//!     users, events, payments, granter,
//!     config.worker.clone(),
//! );
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });
//!
//! // On shutdown:
//! shutdown_tx.send(true)?;
//! handle.await??;
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::WorkerConfig;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::payment::PaymentStatus;
use crate::ports::{
    AccessGranter, CatalogStore, DeferredTask, EmailMessage, EmailSender, PaymentStore,
    QueuedTask, SubscriptionStore, TaskQueue, UserDirectory, WebhookEventStore,
};

/// Background service that executes deferred tasks.
pub struct TaskWorker {
    queue: Arc<dyn TaskQueue>,
    catalog_store: Arc<dyn CatalogStore>,
    subscription_store: Arc<dyn SubscriptionStore>,
    email_sender: Arc<dyn EmailSender>,
    user_directory: Arc<dyn UserDirectory>,
    event_store: Arc<dyn WebhookEventStore>,
    payment_store: Arc<dyn PaymentStore>,
    access_granter: Arc<dyn AccessGranter>,
    config: WorkerConfig,
}

impl TaskWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        catalog_store: Arc<dyn CatalogStore>,
        subscription_store: Arc<dyn SubscriptionStore>,
        email_sender: Arc<dyn EmailSender>,
        user_directory: Arc<dyn UserDirectory>,
        event_store: Arc<dyn WebhookEventStore>,
        payment_store: Arc<dyn PaymentStore>,
        access_granter: Arc<dyn AccessGranter>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            catalog_store,
            subscription_store,
            email_sender,
            user_directory,
            event_store,
            payment_store,
            access_granter,
            config,
        }
    }

    /// Run the worker loop until the shutdown signal flips to `true`.
    ///
    /// On shutdown a final batch is drained so tasks claimed just before
    /// the signal are not left locked until their claim expires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        let mut interval = tokio::time::interval(self.config.poll_interval());

        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            batch_size = self.config.batch_size,
            "Task worker started"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Task worker shutting down, draining final batch");
                        if let Err(e) = self.process_batch().await {
                            tracing::error!(error = %e, "Final batch drain failed");
                        }
                        return Ok(());
                    }
                }
                _ = interval.tick() => {
                    if let Err(e) = self.process_batch().await {
                        tracing::error!(error = %e, "Task batch processing failed");
                    }
                }
            }
        }
    }

    /// Claim and execute one batch. Exposed for tests and manual drains.
    pub async fn poll_once(&self) -> Result<usize, DomainError> {
        self.process_batch().await
    }

    async fn process_batch(&self) -> Result<usize, DomainError> {
        let batch = self.queue.claim_pending(self.config.batch_size).await?;

        if batch.is_empty() {
            return Ok(0);
        }

        tracing::debug!(count = batch.len(), "Claimed task batch");

        let mut completed = 0;
        for queued in batch {
            match self.execute(&queued).await {
                Ok(()) => {
                    self.queue.mark_done(queued.id).await?;
                    completed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        task_id = queued.id,
                        kind = queued.task.kind(),
                        attempts = queued.attempts,
                        error = %e,
                        "Task execution failed"
                    );
                    self.queue.mark_failed(queued.id, &e.message).await?;
                }
            }
        }

        Ok(completed)
    }

    async fn execute(&self, queued: &QueuedTask) -> Result<(), DomainError> {
        match &queued.task {
            DeferredTask::CourseUpdateEmail { course_id } => {
                self.send_course_update_emails(course_id).await
            }
            DeferredTask::InactivitySweep { inactive_days } => {
                self.sweep_inactive_accounts(*inactive_days).await
            }
            DeferredTask::RetryAccessGrant { payment_id } => {
                self.retry_access_grant(payment_id).await
            }
        }
    }

    /// Notify every subscriber of a course that it changed.
    ///
    /// Each recipient gets their own message. Individual delivery failures
    /// are logged and skipped rather than failing the task, because a retry
    /// would re-send to everyone who already got the mail. Only a full
    /// provider outage (zero deliveries) returns the task to the pool.
    async fn send_course_update_emails(
        &self,
        course_id: &crate::domain::foundation::CourseId,
    ) -> Result<(), DomainError> {
        let Some(course) = self.catalog_store.find_course(course_id).await? else {
            tracing::warn!(course_id = %course_id, "Update email for missing course, dropping task");
            return Ok(());
        };

        let recipients = self.subscription_store.list_subscriber_emails(course_id).await?;
        if recipients.is_empty() {
            tracing::debug!(course_id = %course_id, "Course has no subscribers");
            return Ok(());
        }

        let subject = format!("Course updated: {}", course.title);
        let html_body = format!(
            "<p>The course <strong>{}</strong> you subscribed to has been updated. \
             Visit the course page to see what changed.</p>",
            course.title
        );
        let text_body = format!(
            "The course \"{}\" you subscribed to has been updated. \
             Visit the course page to see what changed.",
            course.title
        );

        let total = recipients.len();
        let mut delivered = 0;
        for recipient in recipients {
            let message = EmailMessage::new(vec![recipient.clone()], &subject, &html_body)
                .with_text_body(&text_body);
            match self.email_sender.send(&message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        course_id = %course_id,
                        recipient = %recipient,
                        error = %e,
                        "Course update email delivery failed"
                    );
                }
            }
        }

        if delivered == 0 {
            return Err(DomainError::new(
                ErrorCode::EmailDeliveryError,
                format!("All {} course update deliveries failed", total),
            ));
        }

        tracing::info!(
            course_id = %course_id,
            delivered,
            total,
            "Course update emails sent"
        );
        Ok(())
    }

    /// Deactivate idle accounts and prune old webhook events.
    ///
    /// The inactivity window rides in the task payload so a scheduled sweep
    /// keeps the window it was enqueued with even if configuration changes
    /// before it runs. Webhook retention comes from worker configuration.
    async fn sweep_inactive_accounts(&self, inactive_days: u32) -> Result<(), DomainError> {
        let activity_cutoff = Timestamp::now().minus_days(i64::from(inactive_days));
        let deactivated = self
            .user_directory
            .deactivate_inactive_before(activity_cutoff)
            .await?;

        let retention_cutoff =
            Timestamp::now().minus_days(i64::from(self.config.webhook_retention_days));
        let pruned = self
            .event_store
            .delete_before(*retention_cutoff.as_datetime())
            .await?;

        tracing::info!(
            deactivated,
            pruned_events = pruned,
            inactive_days,
            "Inactivity sweep completed"
        );
        Ok(())
    }

    /// Re-attempt an access grant that failed after settlement.
    ///
    /// The payment is re-read first: tasks for payments that were since
    /// refunded out-of-band or never settled are dropped, and grants are
    /// only issued against records that are currently paid.
    async fn retry_access_grant(
        &self,
        payment_id: &crate::domain::foundation::PaymentId,
    ) -> Result<(), DomainError> {
        let Some(record) = self.payment_store.find_by_id(payment_id).await? else {
            tracing::warn!(payment_id = %payment_id, "Grant retry for unknown payment, dropping task");
            return Ok(());
        };

        if record.status != PaymentStatus::Paid {
            tracing::debug!(
                payment_id = %payment_id,
                status = record.status.as_str(),
                "Grant retry for unsettled payment, dropping task"
            );
            return Ok(());
        }

        match self.access_granter.grant(&record.buyer_id, &record.item).await {
            Ok(()) => {
                tracing::info!(
                    payment_id = %payment_id,
                    buyer_id = %record.buyer_id,
                    "Access grant repaired"
                );
                Ok(())
            }
            Err(e) if e.retryable => {
                Err(DomainError::new(ErrorCode::GrantFailed, e.message))
            }
            Err(e) => {
                tracing::error!(
                    payment_id = %payment_id,
                    buyer_id = %record.buyer_id,
                    error = %e,
                    "Access grant failed permanently, needs manual repair"
                );
                Ok(())
            }
        }
    }
}
