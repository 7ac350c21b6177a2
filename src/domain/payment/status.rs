//! Payment status state machine.
//!
//! A payment is created `pending` and moves exactly once into one of the
//! terminal states. Nothing ever leaves a terminal state; replayed gateway
//! events for a settled payment must find no legal transition to make.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Purchase initiated; the gateway session (if any) is still open.
    Pending,

    /// The gateway confirmed settlement. The only status that grants access.
    Paid,

    /// The checkout session expired or was abandoned before settlement.
    Cancelled,

    /// The gateway reported a failed payment attempt.
    Failed,
}

impl PaymentStatus {
    /// Returns true once money has moved.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Lowercase storage/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Failed => "failed",
        }
    }

    /// All statuses, for exhaustive table checks.
    pub fn all() -> [PaymentStatus; 4] {
        [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Cancelled,
            PaymentStatus::Failed,
        ]
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Paid) | (Pending, Cancelled) | (Pending, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Paid, Cancelled, Failed],
            Paid | Cancelled | Failed => vec![],
        }
    }
}
