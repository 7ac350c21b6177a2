//! Payment store port (write side).
//!
//! Defines the contract for persisting and retrieving payment records.
//!
//! # Design
//!
//! - **Conditional transitions**: `update_status` is the single concurrency
//!   control for settlement. It must compile to one conditional UPDATE whose
//!   row count tells the caller whether it won the transition.
//! - **Append-mostly**: records are created once; later writes only attach
//!   gateway references or move the status forward.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, UserId};
use crate::domain::payment::{ItemRef, PaymentRecord, PaymentStatus};

/// Repository port for payment record persistence.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persist a newly created payment record.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create(&self, record: &PaymentRecord) -> Result<(), DomainError>;

    /// Find a payment by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRecord>, DomainError>;

    /// Find a payment by the gateway checkout session attached to it.
    ///
    /// Returns `None` when no record carries this session.
    async fn find_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Find a paid or still-pending attempt for this buyer and item.
    ///
    /// Used to block duplicate purchases. Returns the newest match.
    async fn find_active_attempt(
        &self,
        buyer_id: &UserId,
        item: &ItemRef,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Conditionally transition a payment's status.
    ///
    /// Returns `true` when the row was in `from` and is now `to`; `false`
    /// when another writer got there first (or the record does not exist).
    /// Implementations must perform this as a single conditional UPDATE.
    async fn update_status(
        &self,
        id: &PaymentId,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<bool, DomainError>;

    /// Attach gateway session references to a pending record.
    ///
    /// Called once per record, immediately after session creation.
    async fn attach_gateway_session(
        &self,
        id: &PaymentId,
        session_id: &str,
        customer_id: Option<&str>,
        metadata: &HashMap<String, String>,
    ) -> Result<(), DomainError>;

    /// Record the gateway payment intent once settlement reports it.
    async fn record_payment_intent(
        &self,
        id: &PaymentId,
        payment_intent_id: &str,
    ) -> Result<(), DomainError>;

    /// List all payments for a buyer, newest first.
    async fn list_for_buyer(&self, buyer_id: &UserId)
        -> Result<Vec<PaymentRecord>, DomainError>;
}
