//! WebhookEventStore port - Interface for the processed-webhook log.
//!
//! This port enables idempotent webhook handling by tracking which gateway
//! events have been seen, together with their full payload and outcome for
//! auditing.
//!
//! ## Why Webhook Idempotency Matters
//!
//! The gateway may deliver the same event multiple times due to:
//! - Network timeouts
//! - 5xx response from our endpoint (triggers retry)
//! - Our endpoint returning success but the gateway not receiving it
//!
//! The conditional status update on payments is the second idempotency belt;
//! this log is the first, and the only one that remembers ignored events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Outcome recorded for a processed webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Event drove a reconciliation action (or idempotently matched one).
    Processed,
    /// Event was acknowledged but intentionally not acted on.
    Ignored,
    /// Processing was attempted and failed.
    Failed,
}

impl EventDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventDisposition::Processed => "processed",
            EventDisposition::Ignored => "ignored",
            EventDisposition::Failed => "failed",
        }
    }
}

impl std::str::FromStr for EventDisposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(EventDisposition::Processed),
            "ignored" => Ok(EventDisposition::Ignored),
            "failed" => Ok(EventDisposition::Failed),
            other => Err(format!("unknown event disposition: {}", other)),
        }
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Gateway event ID (`evt_` prefix at Stripe).
    pub event_id: String,

    /// Gateway event type (e.g., "checkout.session.completed").
    pub event_type: String,

    /// When the event was processed.
    pub processed_at: DateTime<Utc>,

    /// Outcome of processing.
    pub disposition: EventDisposition,

    /// Reason for ignoring, or error message on failure.
    pub note: Option<String>,

    /// Original event payload for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    /// Creates a record for a successfully processed event.
    pub fn processed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            disposition: EventDisposition::Processed,
            note: None,
            payload,
        }
    }

    /// Creates a record for an acknowledged-but-ignored event.
    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            disposition: EventDisposition::Ignored,
            note: Some(reason.into()),
            payload,
        }
    }

    /// Creates a record for a failed processing attempt.
    pub fn failed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        error: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            disposition: EventDisposition::Failed,
            note: Some(error.into()),
            payload,
        }
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// Record already exists (duplicate event).
    AlreadyExists,
}

/// Port for storing and retrieving processed webhook events.
///
/// Implementations should use database constraints (PRIMARY KEY on event_id)
/// to prevent race conditions during concurrent webhook processing.
#[async_trait]
pub trait WebhookEventStore: Send + Sync {
    /// Find a previously processed event by its gateway event ID.
    ///
    /// Returns `None` if the event hasn't been processed yet.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempt to save a webhook event record.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics to handle race conditions.
    /// Returns `SaveResult::Inserted` if this is the first time seeing the
    /// event, or `SaveResult::AlreadyExists` if another delivery won.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Delete records older than the specified timestamp.
    ///
    /// Returns the number of records deleted. Used for log retention.
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_record_has_no_note() {
        let record = WebhookEventRecord::processed(
            "evt_123",
            "checkout.session.completed",
            serde_json::json!({"id": "test"}),
        );

        assert_eq!(record.event_id, "evt_123");
        assert_eq!(record.disposition, EventDisposition::Processed);
        assert!(record.note.is_none());
    }

    #[test]
    fn ignored_record_includes_reason() {
        let record = WebhookEventRecord::ignored(
            "evt_456",
            "payment_intent.succeeded",
            "settled via session event",
            serde_json::json!({}),
        );

        assert_eq!(record.disposition, EventDisposition::Ignored);
        assert_eq!(record.note, Some("settled via session event".to_string()));
    }

    #[test]
    fn failed_record_includes_error() {
        let record = WebhookEventRecord::failed(
            "evt_789",
            "checkout.session.completed",
            "database connection failed",
            serde_json::json!({}),
        );

        assert_eq!(record.disposition, EventDisposition::Failed);
        assert_eq!(record.note, Some("database connection failed".to_string()));
    }

    #[test]
    fn disposition_round_trips_through_str() {
        for d in [
            EventDisposition::Processed,
            EventDisposition::Ignored,
            EventDisposition::Failed,
        ] {
            assert_eq!(d.as_str().parse::<EventDisposition>(), Ok(d));
        }
        assert!("bogus".parse::<EventDisposition>().is_err());
    }

    // Trait object safety test
    #[test]
    fn webhook_event_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn WebhookEventStore) {}
    }
}
