//! Access grant port for purchased content.
//!
//! Settlement calls this port to open the purchased course or lesson to the
//! buyer. The grant sits outside the payment transition on purpose: a paid
//! payment with a failed grant is repaired by the deferred retry task, never
//! by rolling the payment back.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::payment::ItemRef;

/// Error from a grant attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantError {
    /// What went wrong.
    pub message: String,

    /// Whether a later retry can succeed.
    pub retryable: bool,
}

impl GrantError {
    /// A transient failure worth retrying (connectivity, timeouts).
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    /// A permanent failure (item deleted, buyer gone).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

impl std::fmt::Display for GrantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GrantError {}

impl From<GrantError> for DomainError {
    fn from(err: GrantError) -> Self {
        DomainError::new(ErrorCode::GrantFailed, err.message)
            .with_detail("retryable", err.retryable.to_string())
    }
}

/// Port for opening purchased content to a buyer.
#[async_trait]
pub trait AccessGranter: Send + Sync {
    /// Grant the buyer access to the item.
    ///
    /// Must be idempotent: granting already-held access succeeds.
    async fn grant(&self, user_id: &UserId, item: &ItemRef) -> Result<(), GrantError>;

    /// Check whether the user currently holds access to the item.
    async fn has_access(&self, user_id: &UserId, item: &ItemRef) -> Result<bool, DomainError>;
}
