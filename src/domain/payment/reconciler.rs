//! Session reconciler - drives payment records to their terminal status.
//!
//! Both notification paths converge here: verified webhook events and
//! on-demand gateway polls reduce to the same conditional transitions on the
//! payment record. The reconciler never overwrites a terminal status; the
//! single conditional UPDATE in [`PaymentStore::update_status`] decides every
//! race, and losers observe [`ReconcileOutcome::AlreadyReconciled`].
//!
//! ## Settlement Side Effects
//!
//! Winning the pending→paid transition triggers the access grant. The grant
//! is deliberately outside the transition: a paid payment with a failed grant
//! is repaired by the `retry_access_grant` task, never rolled back.

use std::sync::Arc;

use crate::domain::foundation::{PaymentId, UserId};
use crate::ports::{
    AccessGranter, DeferredTask, PaymentStore, SessionPaymentStatus, SessionSnapshot, TaskQueue,
};

use super::errors::PurchaseError;
use super::gateway_event::{GatewayEvent, GatewayEventType};
use super::record::{ItemRef, PaymentRecord};
use super::status::PaymentStatus;

/// What a reconciliation pass did to the payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// This pass won the transition.
    Transitioned {
        payment_id: PaymentId,
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// The record was already terminal; nothing was changed.
    AlreadyReconciled {
        payment_id: PaymentId,
        status: PaymentStatus,
    },

    /// No payment record matched the event's correlation keys.
    RecordNotFound { reference: String },

    /// The event or snapshot carried nothing actionable.
    NoChange { reason: String },
}

impl ReconcileOutcome {
    /// True when this pass moved the record.
    pub fn is_transition(&self) -> bool {
        matches!(self, ReconcileOutcome::Transitioned { .. })
    }

    /// True when the outcome should be logged as acknowledged-but-ignored.
    pub fn is_ignored(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::RecordNotFound { .. } | ReconcileOutcome::NoChange { .. }
        )
    }
}

/// Applies gateway notifications and snapshots to payment records.
pub struct SessionReconciler {
    payment_store: Arc<dyn PaymentStore>,
    access_granter: Arc<dyn AccessGranter>,
    task_queue: Arc<dyn TaskQueue>,
}

impl SessionReconciler {
    pub fn new(
        payment_store: Arc<dyn PaymentStore>,
        access_granter: Arc<dyn AccessGranter>,
        task_queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            payment_store,
            access_granter,
            task_queue,
        }
    }

    /// Apply a verified webhook event.
    ///
    /// Only session lifecycle and intent failure events act on records;
    /// everything else is acknowledged without effect.
    pub async fn apply_event(
        &self,
        event: &GatewayEvent,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        match event.parsed_type() {
            GatewayEventType::SessionCompleted => self.settle_from_event(event).await,
            GatewayEventType::SessionExpired => {
                self.close_from_event(event, PaymentStatus::Cancelled).await
            }
            GatewayEventType::PaymentIntentFailed => {
                self.close_from_event(event, PaymentStatus::Failed).await
            }
            // The session.completed event already settles the purchase; the
            // intent-level success only duplicates it.
            GatewayEventType::PaymentIntentSucceeded => Ok(ReconcileOutcome::NoChange {
                reason: "settled via checkout.session.completed".to_string(),
            }),
            GatewayEventType::Unknown(event_type) => Ok(ReconcileOutcome::NoChange {
                reason: format!("unhandled event type: {}", event_type),
            }),
        }
    }

    /// Apply a session snapshot obtained by polling the gateway.
    ///
    /// Used when the buyer checks their payment before any webhook arrived.
    pub async fn apply_snapshot(
        &self,
        record: &PaymentRecord,
        snapshot: &SessionSnapshot,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        match snapshot.payment_status {
            SessionPaymentStatus::Paid | SessionPaymentStatus::NoPaymentRequired => {
                self.settle(record, snapshot.payment_intent_id.as_deref())
                    .await
            }
            SessionPaymentStatus::Expired => {
                self.close(record, PaymentStatus::Cancelled).await
            }
            SessionPaymentStatus::Unpaid => Ok(ReconcileOutcome::NoChange {
                reason: "session still open".to_string(),
            }),
        }
    }

    async fn settle_from_event(
        &self,
        event: &GatewayEvent,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        if !event.is_session_object() {
            return Ok(ReconcileOutcome::NoChange {
                reason: "event does not carry a checkout session".to_string(),
            });
        }

        // Sessions completed through delayed payment methods report
        // `payment_status: unpaid`; money arrives with a later event.
        match event.data.object.get("payment_status").and_then(|v| v.as_str()) {
            Some("paid") | Some("no_payment_required") => {}
            Some("unpaid") => {
                return Ok(ReconcileOutcome::NoChange {
                    reason: "session completed but payment still processing".to_string(),
                });
            }
            other => {
                return Ok(ReconcileOutcome::NoChange {
                    reason: format!("unrecognized payment_status: {:?}", other),
                });
            }
        }

        let record = match self.locate_record(event).await? {
            Some(record) => record,
            None => {
                return Ok(ReconcileOutcome::RecordNotFound {
                    reference: event.id.clone(),
                })
            }
        };

        self.settle(&record, event.payment_intent_id()).await
    }

    async fn close_from_event(
        &self,
        event: &GatewayEvent,
        to: PaymentStatus,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        let record = match self.locate_record(event).await? {
            Some(record) => record,
            None => {
                return Ok(ReconcileOutcome::RecordNotFound {
                    reference: event.id.clone(),
                })
            }
        };

        self.close(&record, to).await
    }

    /// Correlate an event back to a payment record.
    ///
    /// Session metadata carries our payment id; older records created before
    /// the session id was attached are found by the session id itself.
    async fn locate_record(
        &self,
        event: &GatewayEvent,
    ) -> Result<Option<PaymentRecord>, PurchaseError> {
        if let Some(raw) = event.metadata_payment_id() {
            if let Ok(payment_id) = raw.parse::<PaymentId>() {
                if let Some(record) = self
                    .payment_store
                    .find_by_id(&payment_id)
                    .await
                    .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
                {
                    return Ok(Some(record));
                }
            }
        }

        if let Some(session_id) = event.session_id() {
            return self
                .payment_store
                .find_by_session_id(session_id)
                .await
                .map_err(|e| PurchaseError::infrastructure(e.to_string()));
        }

        Ok(None)
    }

    /// Win or lose the pending→paid transition, then grant access.
    async fn settle(
        &self,
        record: &PaymentRecord,
        payment_intent_id: Option<&str>,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        if record.status != PaymentStatus::Pending {
            return Ok(ReconcileOutcome::AlreadyReconciled {
                payment_id: record.id,
                status: record.status,
            });
        }

        let won = self
            .payment_store
            .update_status(&record.id, PaymentStatus::Pending, PaymentStatus::Paid)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;

        if !won {
            return self.observed_status(&record.id).await;
        }

        if let Some(intent_id) = payment_intent_id {
            // Enrichment only; the transition already committed.
            if let Err(e) = self
                .payment_store
                .record_payment_intent(&record.id, intent_id)
                .await
            {
                tracing::warn!(
                    payment_id = %record.id,
                    error = %e,
                    "failed to record payment intent after settlement"
                );
            }
        }

        self.grant_access(&record.id, &record.buyer_id, &record.item)
            .await?;

        Ok(ReconcileOutcome::Transitioned {
            payment_id: record.id,
            from: PaymentStatus::Pending,
            to: PaymentStatus::Paid,
        })
    }

    /// Win or lose a pending→cancelled/failed transition.
    async fn close(
        &self,
        record: &PaymentRecord,
        to: PaymentStatus,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        if record.status != PaymentStatus::Pending {
            return Ok(ReconcileOutcome::AlreadyReconciled {
                payment_id: record.id,
                status: record.status,
            });
        }

        let won = self
            .payment_store
            .update_status(&record.id, PaymentStatus::Pending, to)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?;

        if !won {
            return self.observed_status(&record.id).await;
        }

        Ok(ReconcileOutcome::Transitioned {
            payment_id: record.id,
            from: PaymentStatus::Pending,
            to,
        })
    }

    /// Grant access after a won settlement, falling back to the retry task.
    async fn grant_access(
        &self,
        payment_id: &PaymentId,
        buyer_id: &UserId,
        item: &ItemRef,
    ) -> Result<(), PurchaseError> {
        match self.access_granter.grant(buyer_id, item).await {
            Ok(()) => Ok(()),
            Err(e) if e.retryable => {
                tracing::warn!(
                    payment_id = %payment_id,
                    error = %e,
                    "access grant failed, scheduling retry"
                );
                self.task_queue
                    .enqueue(&DeferredTask::RetryAccessGrant {
                        payment_id: *payment_id,
                    })
                    .await
                    .map_err(|e| PurchaseError::infrastructure(e.to_string()))
            }
            Err(e) => {
                tracing::error!(
                    payment_id = %payment_id,
                    error = %e,
                    "access grant failed permanently"
                );
                Ok(())
            }
        }
    }

    /// Report the status another writer left behind.
    async fn observed_status(
        &self,
        payment_id: &PaymentId,
    ) -> Result<ReconcileOutcome, PurchaseError> {
        let current = self
            .payment_store
            .find_by_id(payment_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| PurchaseError::payment_not_found(*payment_id))?;

        Ok(ReconcileOutcome::AlreadyReconciled {
            payment_id: current.id,
            status: current.status,
        })
    }
}
