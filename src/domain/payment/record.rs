//! Payment record aggregate.
//!
//! One row per purchase intent. The record is append-mostly: everything but
//! `status`, the set-once gateway references, and `updated_at` is fixed at
//! creation. Status is owned exclusively by the reconciler and only ever
//! changes through the store's conditional update.
//!
//! # Design Decisions
//!
//! - **Course XOR lesson**: a record references exactly one purchasable item,
//!   enforced by construction (`ItemRef` is an enum, not two nullable ids).
//! - **Price fixed at creation**: the amount is copied from the catalog at
//!   purchase time; later price edits never touch open payments.
//! - **Gateway ids set once**: session/customer ids are attached after the
//!   remote session is created and never reassigned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, LessonId, Money, PaymentId, Timestamp, UserId,
};

use super::PaymentStatus;

/// The purchasable item a payment is for: exactly one of course or lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Course(CourseId),
    Lesson(LessonId),
}

impl ItemRef {
    /// Builds an item reference from the two optional request fields,
    /// enforcing the exactly-one rule.
    pub fn from_optional(
        course_id: Option<i64>,
        lesson_id: Option<i64>,
    ) -> Result<Self, DomainError> {
        match (course_id, lesson_id) {
            (Some(course), None) => Ok(ItemRef::Course(CourseId::new(course))),
            (None, Some(lesson)) => Ok(ItemRef::Lesson(LessonId::new(lesson))),
            (Some(_), Some(_)) => Err(DomainError::validation(
                "item",
                "Specify either course_id or lesson_id, not both",
            )),
            (None, None) => Err(DomainError::validation(
                "item",
                "Specify course_id or lesson_id",
            )),
        }
    }

    /// `"course"` or `"lesson"`.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemRef::Course(_) => "course",
            ItemRef::Lesson(_) => "lesson",
        }
    }

    /// The raw surrogate key of whichever variant is set.
    pub fn raw_id(&self) -> i64 {
        match self {
            ItemRef::Course(id) => id.value(),
            ItemRef::Lesson(id) => id.value(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.raw_id())
    }
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Settled in person; no gateway session is opened.
    Cash,
    /// Settled by bank transfer; no gateway session is opened.
    Transfer,
    /// Settled through the hosted checkout gateway.
    Gateway,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Gateway => "gateway",
        }
    }

    /// Whether this method settles through the external gateway.
    pub fn uses_gateway(&self) -> bool {
        matches!(self, PaymentMethod::Gateway)
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Gateway
    }
}

/// Everything needed to open a payment record.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub buyer_id: UserId,
    pub item: ItemRef,
    pub amount: Money,
    pub method: PaymentMethod,
}

/// Payment record aggregate.
///
/// # Invariants
///
/// - references exactly one item (course XOR lesson)
/// - created `pending`; reaches a terminal status at most once
/// - gateway references are never reassigned once set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Internal identifier, assigned at creation.
    pub id: PaymentId,

    /// The purchasing account.
    pub buyer_id: UserId,

    /// What is being bought.
    pub item: ItemRef,

    /// Price fixed at creation from the catalog.
    pub amount: Money,

    /// Settlement channel.
    pub method: PaymentMethod,

    /// Lifecycle status; mutated only through the conditional update.
    pub status: PaymentStatus,

    /// Opaque gateway checkout session id, set once.
    pub gateway_session_id: Option<String>,

    /// Opaque gateway payment-intent id, recorded at settlement.
    pub gateway_payment_intent_id: Option<String>,

    /// Opaque gateway customer id, set once.
    pub gateway_customer_id: Option<String>,

    /// Key-value bag echoed back by the gateway, stored verbatim.
    pub gateway_metadata: HashMap<String, String>,

    pub created_at: Timestamp,

    /// Changes on every status transition.
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    /// Opens a new pending record from a draft.
    pub fn create(draft: PaymentDraft) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            buyer_id: draft.buyer_id,
            item: draft.item,
            amount: draft.amount,
            method: draft.method,
            status: PaymentStatus::Pending,
            gateway_session_id: None,
            gateway_payment_intent_id: None,
            gateway_customer_id: None,
            gateway_metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the gateway session created for this record.
    ///
    /// # Errors
    ///
    /// Fails if a session is already attached; sessions are never replaced.
    pub fn attach_gateway_session(
        &mut self,
        session_id: impl Into<String>,
        customer_id: Option<String>,
        metadata: HashMap<String, String>,
    ) -> Result<(), DomainError> {
        if self.gateway_session_id.is_some() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Gateway session already attached",
            )
            .with_detail("payment_id", self.id.to_string()));
        }
        self.gateway_session_id = Some(session_id.into());
        self.gateway_customer_id = customer_id;
        self.gateway_metadata = metadata;
        Ok(())
    }

    /// True once the record is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        use crate::domain::foundation::StateMachine;
        self.status.is_terminal()
    }

    /// True if this record counts against the duplicate-purchase rule:
    /// a settled or still-open attempt for the same (buyer, item).
    pub fn blocks_repurchase(&self) -> bool {
        matches!(self.status, PaymentStatus::Paid | PaymentStatus::Pending)
    }
}
