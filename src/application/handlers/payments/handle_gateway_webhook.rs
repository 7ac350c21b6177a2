//! HandleGatewayWebhookHandler - Command handler for inbound gateway deliveries.
//!
//! Verifies the delivery signature, deduplicates by event id, feeds the event
//! through the reconciler, and records the disposition. Reconciliation
//! failures are recorded and acknowledged rather than bounced; the gateway's
//! retry schedule is no substitute for the event log.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::payment::{PurchaseError, ReconcileOutcome, SessionReconciler, WebhookVerifier};
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventStore};

/// Command carrying a raw webhook delivery.
///
/// The payload stays as received bytes; the signature covers the exact wire
/// form and any re-serialization would invalidate it.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    pub payload: Vec<u8>,
    pub signature_header: String,
}

/// How the delivery was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Signature valid, event fed to the reconciler.
    Reconciled { outcome: ReconcileOutcome },
    /// Event id seen before; nothing re-applied.
    AlreadyProcessed,
    /// Reconciliation failed; recorded for replay triage.
    Failed { error: String },
}

/// Result of handling a webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookResult {
    pub event_id: String,
    pub event_type: String,
    pub outcome: WebhookOutcome,
}

/// Handler for gateway webhook deliveries.
pub struct HandleGatewayWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    event_store: Arc<dyn WebhookEventStore>,
    reconciler: Arc<SessionReconciler>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        verifier: Arc<WebhookVerifier>,
        event_store: Arc<dyn WebhookEventStore>,
        reconciler: Arc<SessionReconciler>,
    ) -> Self {
        Self {
            verifier,
            event_store,
            reconciler,
        }
    }

    pub async fn handle(
        &self,
        command: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, PurchaseError> {
        // 1. Authenticate the delivery before trusting anything in the body
        let event = self
            .verifier
            .verify_and_parse(&command.payload, &command.signature_header)
            .map_err(|e| PurchaseError::validation("signature", e.to_string()))?;

        // 2. Deduplicate by event id; replays of any recorded disposition are
        //    acknowledged without touching payment state
        let already_seen = self
            .event_store
            .find_by_event_id(&event.id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;
        if already_seen.is_some() {
            tracing::debug!(event_id = %event.id, "Duplicate delivery acknowledged");
            return Ok(HandleGatewayWebhookResult {
                event_id: event.id,
                event_type: event.event_type,
                outcome: WebhookOutcome::AlreadyProcessed,
            });
        }

        let payload_json: Value = serde_json::from_slice(&command.payload).unwrap_or(Value::Null);

        // 3. Reconcile and pick the disposition to record
        let (record, outcome) = match self.reconciler.apply_event(&event).await {
            Ok(outcome) => {
                let record = match &outcome {
                    ReconcileOutcome::Transitioned { .. }
                    | ReconcileOutcome::AlreadyReconciled { .. } => {
                        WebhookEventRecord::processed(&event.id, &event.event_type, payload_json)
                    }
                    ReconcileOutcome::RecordNotFound { reference } => WebhookEventRecord::ignored(
                        &event.id,
                        &event.event_type,
                        format!("No payment record matches {}", reference),
                        payload_json,
                    ),
                    ReconcileOutcome::NoChange { reason } => WebhookEventRecord::ignored(
                        &event.id,
                        &event.event_type,
                        reason.clone(),
                        payload_json,
                    ),
                };
                (record, WebhookOutcome::Reconciled { outcome })
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Webhook reconciliation failed; recorded for replay"
                );
                let error = e.to_string();
                (
                    WebhookEventRecord::failed(&event.id, &event.event_type, &error, payload_json),
                    WebhookOutcome::Failed { error },
                )
            }
        };

        // 4. Losing the insert race means a concurrent delivery of the same
        //    event landed first; the reconciler already behaved idempotently
        match self
            .event_store
            .save(record)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
        {
            SaveResult::Inserted => {}
            SaveResult::AlreadyExists => {
                tracing::debug!(
                    event_id = %event.id,
                    "Concurrent delivery recorded this event first"
                );
            }
        }

        Ok(HandleGatewayWebhookResult {
            event_id: event.id,
            event_type: event.event_type,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use secrecy::SecretString;

    use crate::domain::foundation::{CourseId, Currency, DomainError, Money, PaymentId, UserId};
    use crate::domain::payment::{
        compute_test_signature, ItemRef, PaymentDraft, PaymentMethod, PaymentRecord, PaymentStatus,
    };
    use crate::ports::{
        AccessGranter, DeferredTask, EventDisposition, GrantError, PaymentStore, QueuedTask,
        TaskQueue,
    };

    const TEST_SECRET: &str = "whsec_handler_tests";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockEventStore {
        records: Mutex<HashMap<String, WebhookEventRecord>>,
        force_conflict: bool,
    }

    impl MockEventStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                force_conflict: false,
            }
        }

        fn with_record(record: WebhookEventRecord) -> Self {
            let store = Self::new();
            store
                .records
                .lock()
                .unwrap()
                .insert(record.event_id.clone(), record);
            store
        }

        fn racing_on_save() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                force_conflict: true,
            }
        }

        fn saved(&self, event_id: &str) -> Option<WebhookEventRecord> {
            self.records.lock().unwrap().get(event_id).cloned()
        }

        fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl WebhookEventStore for MockEventStore {
        async fn find_by_event_id(
            &self,
            event_id: &str,
        ) -> Result<Option<WebhookEventRecord>, DomainError> {
            Ok(self.records.lock().unwrap().get(event_id).cloned())
        }

        async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
            if self.force_conflict {
                return Ok(SaveResult::AlreadyExists);
            }
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&record.event_id) {
                return Ok(SaveResult::AlreadyExists);
            }
            records.insert(record.event_id.clone(), record);
            Ok(SaveResult::Inserted)
        }

        async fn delete_before(
            &self,
            _timestamp: chrono::DateTime<chrono::Utc>,
        ) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    struct MockPaymentStore {
        records: Mutex<HashMap<PaymentId, PaymentRecord>>,
        fail_updates: bool,
    }

    impl MockPaymentStore {
        fn with_record(record: PaymentRecord) -> Self {
            let mut records = HashMap::new();
            records.insert(record.id, record);
            Self {
                records: Mutex::new(records),
                fail_updates: false,
            }
        }

        fn empty() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                fail_updates: false,
            }
        }

        fn failing_updates(record: PaymentRecord) -> Self {
            let store = Self::with_record(record);
            Self {
                records: store.records,
                fail_updates: true,
            }
        }

        fn status_of(&self, id: &PaymentId) -> PaymentStatus {
            self.records.lock().unwrap().get(id).unwrap().status
        }
    }

    #[async_trait]
    impl PaymentStore for MockPaymentStore {
        async fn create(&self, record: &PaymentRecord) -> Result<(), DomainError> {
            self.records
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        async fn find_by_session_id(
            &self,
            session_id: &str,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|r| r.gateway_session_id.as_deref() == Some(session_id))
                .cloned())
        }

        async fn find_active_attempt(
            &self,
            _buyer_id: &UserId,
            _item: &ItemRef,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(None)
        }

        async fn update_status(
            &self,
            id: &PaymentId,
            from: PaymentStatus,
            to: PaymentStatus,
        ) -> Result<bool, DomainError> {
            if self.fail_updates {
                return Err(DomainError::new(
                    crate::domain::foundation::ErrorCode::DatabaseError,
                    "update refused",
                ));
            }
            let mut records = self.records.lock().unwrap();
            match records.get_mut(id) {
                Some(record) if record.status == from => {
                    record.status = to;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn attach_gateway_session(
            &self,
            _id: &PaymentId,
            _session_id: &str,
            _customer_id: Option<&str>,
            _metadata: &HashMap<String, String>,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn record_payment_intent(
            &self,
            id: &PaymentId,
            payment_intent_id: &str,
        ) -> Result<(), DomainError> {
            if let Some(record) = self.records.lock().unwrap().get_mut(id) {
                record.gateway_payment_intent_id = Some(payment_intent_id.to_string());
            }
            Ok(())
        }

        async fn list_for_buyer(
            &self,
            _buyer_id: &UserId,
        ) -> Result<Vec<PaymentRecord>, DomainError> {
            Ok(vec![])
        }
    }

    struct MockAccessGranter {
        grants: Mutex<u32>,
    }

    impl MockAccessGranter {
        fn new() -> Self {
            Self {
                grants: Mutex::new(0),
            }
        }

        fn grant_count(&self) -> u32 {
            *self.grants.lock().unwrap()
        }
    }

    #[async_trait]
    impl AccessGranter for MockAccessGranter {
        async fn grant(&self, _user_id: &UserId, _item: &ItemRef) -> Result<(), GrantError> {
            *self.grants.lock().unwrap() += 1;
            Ok(())
        }

        async fn has_access(
            &self,
            _user_id: &UserId,
            _item: &ItemRef,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    struct MockTaskQueue;

    #[async_trait]
    impl TaskQueue for MockTaskQueue {
        async fn enqueue(&self, _task: &DeferredTask) -> Result<(), DomainError> {
            Ok(())
        }

        async fn claim_pending(&self, _limit: u32) -> Result<Vec<QueuedTask>, DomainError> {
            Ok(vec![])
        }

        async fn mark_done(&self, _id: i64) -> Result<(), DomainError> {
            Ok(())
        }

        async fn mark_failed(&self, _id: i64, _error: &str) -> Result<(), DomainError> {
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn buyer() -> UserId {
        UserId::new("tg-501").unwrap()
    }

    fn pending_with_session(session_id: &str) -> PaymentRecord {
        let mut record = PaymentRecord::create(PaymentDraft {
            buyer_id: buyer(),
            item: ItemRef::Course(CourseId::new(42)),
            amount: Money::from_minor_units(50_000, Currency::Rub).unwrap(),
            method: PaymentMethod::Gateway,
        });
        record
            .attach_gateway_session(session_id, None, HashMap::new())
            .unwrap();
        record
    }

    fn session_event(event_id: &str, event_type: &str, session_id: &str, status: &str) -> String {
        serde_json::json!({
            "id": event_id,
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "livemode": false,
            "data": {
                "object": {
                    "object": "checkout.session",
                    "id": session_id,
                    "payment_status": status,
                    "payment_intent": "pi_wh_1",
                    "metadata": {}
                }
            }
        })
        .to_string()
    }

    fn signed(payload: &str) -> HandleGatewayWebhookCommand {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);
        HandleGatewayWebhookCommand {
            payload: payload.as_bytes().to_vec(),
            signature_header: format!("t={},v1={}", timestamp, signature),
        }
    }

    fn handler_with(
        payment_store: MockPaymentStore,
        event_store: MockEventStore,
    ) -> (
        Arc<MockPaymentStore>,
        Arc<MockEventStore>,
        Arc<MockAccessGranter>,
        HandleGatewayWebhookHandler,
    ) {
        let payment_store = Arc::new(payment_store);
        let event_store = Arc::new(event_store);
        let granter = Arc::new(MockAccessGranter::new());
        let reconciler = Arc::new(SessionReconciler::new(
            payment_store.clone(),
            granter.clone(),
            Arc::new(MockTaskQueue),
        ));
        let handler = HandleGatewayWebhookHandler::new(
            Arc::new(WebhookVerifier::new(SecretString::new(
                TEST_SECRET.to_string(),
            ))),
            event_store.clone(),
            reconciler,
        );
        (payment_store, event_store, granter, handler)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn settles_payment_on_completed_session() {
        let record = pending_with_session("cs_wh_1");
        let id = record.id;
        let (payments, events, granter, handler) =
            handler_with(MockPaymentStore::with_record(record), MockEventStore::new());

        let payload = session_event("evt_1", "checkout.session.completed", "cs_wh_1", "paid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert_eq!(result.event_id, "evt_1");
        assert!(matches!(
            result.outcome,
            WebhookOutcome::Reconciled {
                outcome: ReconcileOutcome::Transitioned { .. }
            }
        ));
        assert_eq!(payments.status_of(&id), PaymentStatus::Paid);
        assert_eq!(granter.grant_count(), 1);

        let saved = events.saved("evt_1").unwrap();
        assert_eq!(saved.disposition, EventDisposition::Processed);
        assert_eq!(saved.event_type, "checkout.session.completed");
        assert!(saved.payload.is_object());
    }

    #[tokio::test]
    async fn cancels_payment_on_expired_session() {
        let record = pending_with_session("cs_wh_2");
        let id = record.id;
        let (payments, events, granter, handler) =
            handler_with(MockPaymentStore::with_record(record), MockEventStore::new());

        let payload = session_event("evt_2", "checkout.session.expired", "cs_wh_2", "unpaid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert!(matches!(
            result.outcome,
            WebhookOutcome::Reconciled {
                outcome: ReconcileOutcome::Transitioned { .. }
            }
        ));
        assert_eq!(payments.status_of(&id), PaymentStatus::Cancelled);
        assert_eq!(granter.grant_count(), 0);
        assert_eq!(
            events.saved("evt_2").unwrap().disposition,
            EventDisposition::Processed
        );
    }

    #[tokio::test]
    async fn duplicate_event_id_is_acknowledged_without_reapplying() {
        let record = pending_with_session("cs_wh_3");
        let id = record.id;
        let prior = WebhookEventRecord::processed(
            "evt_3",
            "checkout.session.completed",
            serde_json::Value::Null,
        );
        let (payments, events, _, handler) = handler_with(
            MockPaymentStore::with_record(record),
            MockEventStore::with_record(prior),
        );

        let payload = session_event("evt_3", "checkout.session.completed", "cs_wh_3", "paid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert_eq!(result.outcome, WebhookOutcome::AlreadyProcessed);
        assert_eq!(payments.status_of(&id), PaymentStatus::Pending);
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn unmatched_session_is_recorded_as_ignored() {
        let (_, events, _, handler) =
            handler_with(MockPaymentStore::empty(), MockEventStore::new());

        let payload = session_event("evt_4", "checkout.session.completed", "cs_ghost", "paid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert!(matches!(
            result.outcome,
            WebhookOutcome::Reconciled {
                outcome: ReconcileOutcome::RecordNotFound { .. }
            }
        ));
        let saved = events.saved("evt_4").unwrap();
        assert_eq!(saved.disposition, EventDisposition::Ignored);
        assert!(saved.note.unwrap().contains("No payment record matches"));
    }

    #[tokio::test]
    async fn unrecognized_event_type_is_recorded_as_ignored() {
        let (_, events, _, handler) =
            handler_with(MockPaymentStore::empty(), MockEventStore::new());

        let payload = session_event("evt_5", "invoice.created", "cs_wh_5", "paid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert!(matches!(
            result.outcome,
            WebhookOutcome::Reconciled {
                outcome: ReconcileOutcome::NoChange { .. }
            }
        ));
        assert_eq!(
            events.saved("evt_5").unwrap().disposition,
            EventDisposition::Ignored
        );
    }

    #[tokio::test]
    async fn losing_the_save_race_still_acknowledges() {
        let record = pending_with_session("cs_wh_6");
        let (_, _, _, handler) = handler_with(
            MockPaymentStore::with_record(record),
            MockEventStore::racing_on_save(),
        );

        let payload = session_event("evt_6", "checkout.session.completed", "cs_wh_6", "paid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert!(matches!(result.outcome, WebhookOutcome::Reconciled { .. }));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn bad_signature_is_a_validation_error() {
        let (_, events, _, handler) =
            handler_with(MockPaymentStore::empty(), MockEventStore::new());

        let payload = session_event("evt_7", "checkout.session.completed", "cs_wh_7", "paid");
        let timestamp = chrono::Utc::now().timestamp();
        let forged = compute_test_signature("whsec_wrong_secret", timestamp, &payload);
        let command = HandleGatewayWebhookCommand {
            payload: payload.into_bytes(),
            signature_header: format!("t={},v1={}", timestamp, forged),
        };

        let result = handler.handle(command).await;

        assert!(matches!(
            result,
            Err(PurchaseError::ValidationFailed { ref field, .. }) if field == "signature"
        ));
        assert_eq!(events.len(), 0);
    }

    #[tokio::test]
    async fn malformed_header_is_a_validation_error() {
        let (_, events, _, handler) =
            handler_with(MockPaymentStore::empty(), MockEventStore::new());

        let payload = session_event("evt_8", "checkout.session.completed", "cs_wh_8", "paid");
        let command = HandleGatewayWebhookCommand {
            payload: payload.into_bytes(),
            signature_header: "not-a-signature".to_string(),
        };

        let result = handler.handle(command).await;

        assert!(matches!(result, Err(PurchaseError::ValidationFailed { .. })));
        assert_eq!(events.len(), 0);
    }

    #[tokio::test]
    async fn reconciler_failure_is_recorded_and_acknowledged() {
        let record = pending_with_session("cs_wh_9");
        let id = record.id;
        let (payments, events, _, handler) = handler_with(
            MockPaymentStore::failing_updates(record),
            MockEventStore::new(),
        );

        let payload = session_event("evt_9", "checkout.session.completed", "cs_wh_9", "paid");
        let result = handler.handle(signed(&payload)).await.unwrap();

        assert!(matches!(result.outcome, WebhookOutcome::Failed { .. }));
        assert_eq!(payments.status_of(&id), PaymentStatus::Pending);
        let saved = events.saved("evt_9").unwrap();
        assert_eq!(saved.disposition, EventDisposition::Failed);
        assert!(saved.note.is_some());
    }
}
