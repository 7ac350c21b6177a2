//! CheckPaymentStatusHandler - Query handler for the client-initiated poll path.
//!
//! The buyer's browser returns from checkout before the webhook lands more
//! often than not. This handler retrieves the gateway's view of the session
//! and feeds it through the reconciler, so the response already reflects the
//! settled status.

use std::sync::Arc;

use crate::domain::foundation::{PaymentId, UserId};
use crate::domain::payment::{PaymentRecord, PurchaseError, SessionReconciler};
use crate::ports::{PaymentGateway, PaymentStore};

/// Query for a payment's current status.
#[derive(Debug, Clone)]
pub struct CheckPaymentStatusQuery {
    pub payment_id: PaymentId,
    pub requester_id: UserId,
}

/// The payment as of this check, reconciled against the gateway when possible.
#[derive(Debug, Clone)]
pub struct CheckPaymentStatusResult {
    pub payment: PaymentRecord,
}

/// Handler for polling a payment's status.
pub struct CheckPaymentStatusHandler {
    payment_store: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    reconciler: Arc<SessionReconciler>,
}

impl CheckPaymentStatusHandler {
    pub fn new(
        payment_store: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        reconciler: Arc<SessionReconciler>,
    ) -> Self {
        Self {
            payment_store,
            gateway,
            reconciler,
        }
    }

    pub async fn handle(
        &self,
        query: CheckPaymentStatusQuery,
    ) -> Result<CheckPaymentStatusResult, PurchaseError> {
        // 1. Load the record and enforce owner-only visibility
        let record = self
            .payment_store
            .find_by_id(&query.payment_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| PurchaseError::payment_not_found(query.payment_id))?;

        if record.buyer_id != query.requester_id {
            return Err(PurchaseError::forbidden(
                "Payments are visible to their buyer only",
            ));
        }

        // 2. Terminal records need no poll
        if record.is_terminal() {
            return Ok(CheckPaymentStatusResult { payment: record });
        }

        // 3. Cash/transfer records, and gateway records whose session never
        //    opened, stay pending until settled elsewhere
        let session_id = match &record.gateway_session_id {
            Some(id) => id.clone(),
            None => return Ok(CheckPaymentStatusResult { payment: record }),
        };

        // 4. Ask the gateway for the session's current state
        let snapshot = self
            .gateway
            .retrieve_session(&session_id)
            .await
            .map_err(|e| PurchaseError::gateway_unavailable(e.to_string()))?;

        // 5. Reconcile; the conditional update decides any race with webhooks
        let outcome = self.reconciler.apply_snapshot(&record, &snapshot).await?;

        tracing::debug!(
            payment_id = %record.id,
            session_id = %session_id,
            outcome = ?outcome,
            "Poll reconciliation finished"
        );

        // 6. Report whatever status the record holds now
        let current = self
            .payment_store
            .find_by_id(&query.payment_id)
            .await
            .map_err(|e| PurchaseError::infrastructure(e.to_string()))?
            .ok_or_else(|| PurchaseError::payment_not_found(query.payment_id))?;

        Ok(CheckPaymentStatusResult { payment: current })
    }
}
