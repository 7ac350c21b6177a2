//! Payment gateway port for hosted checkout processing.
//!
//! Defines the contract for the external payment provider (e.g., Stripe).
//! Implementations create hosted checkout sessions for one-off purchases and
//! retrieve session state for on-demand reconciliation.
//!
//! # Design
//!
//! - **One-off payments**: Single charges for catalog items, no recurring billing
//! - **Correlation first**: Every session carries the internal payment id as
//!   metadata so webhooks and polls can be matched back to a record
//! - **Idempotent**: Operations can be safely retried

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, Money, PaymentId, UserId};
use crate::domain::payment::PurchaseError;

/// Port for the hosted-checkout payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for a pending payment.
    ///
    /// The returned handle carries the URL the buyer is redirected to.
    /// Implementations must attach the payment id as session metadata.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<SessionHandle, GatewayError>;

    /// Retrieve the current state of a checkout session.
    ///
    /// Used by the on-demand poll path when no webhook has arrived yet.
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionSnapshot, GatewayError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    /// Internal payment record this session settles.
    pub payment_id: PaymentId,

    /// Buyer the session belongs to.
    pub buyer_id: UserId,

    /// Display name shown on the checkout page.
    pub item_name: String,

    /// Amount to charge.
    pub amount: Money,

    /// Buyer email for receipt pre-fill, when known.
    pub customer_email: Option<String>,
}

/// Newly created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHandle {
    /// Provider's session ID (`cs_` prefix at Stripe).
    pub id: String,

    /// URL for the buyer to complete checkout.
    pub url: String,

    /// Provider customer ID when one was created.
    pub customer_id: Option<String>,

    /// When the session expires (Unix timestamp).
    pub expires_at: i64,

    /// Metadata echoed back by the provider.
    pub metadata: HashMap<String, String>,
}

/// Point-in-time state of a checkout session as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Provider's session ID.
    pub id: String,

    /// Settlement state the snapshot reports.
    pub payment_status: SessionPaymentStatus,

    /// Provider's payment intent ID once one exists.
    pub payment_intent_id: Option<String>,

    /// Provider customer ID.
    pub customer_id: Option<String>,

    /// Session metadata, including the internal payment id.
    pub metadata: HashMap<String, String>,
}

/// Settlement state of a checkout session.
///
/// Collapses the provider's session `status` and `payment_status` fields into
/// the one question reconciliation asks: did money move, and can it still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentStatus {
    /// Session is open but no payment has been captured yet.
    Unpaid,

    /// Payment was captured.
    Paid,

    /// Session completed with nothing owed (100% discount, zero amount).
    NoPaymentRequired,

    /// Session expired before the buyer paid.
    Expired,
}

impl SessionPaymentStatus {
    /// True when the session settled in the buyer's favor.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionPaymentStatus::Paid | SessionPaymentStatus::NoPaymentRequired
        )
    }
}

/// Errors from gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the provider's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a provider-side error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        DomainError::new(ErrorCode::GatewayUnavailable, err.message)
            .with_detail("gateway_code", err.code.to_string())
    }
}

impl From<GatewayError> for PurchaseError {
    fn from(err: GatewayError) -> Self {
        PurchaseError::gateway_unavailable(err.to_string())
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Request was rejected as malformed.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Resource not found at the provider.
    NotFound,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn settled_states() {
        assert!(SessionPaymentStatus::Paid.is_settled());
        assert!(SessionPaymentStatus::NoPaymentRequired.is_settled());

        assert!(!SessionPaymentStatus::Unpaid.is_settled());
        assert!(!SessionPaymentStatus::Expired.is_settled());
    }

    #[test]
    fn gateway_error_retryable() {
        assert!(GatewayErrorCode::NetworkError.is_retryable());
        assert!(GatewayErrorCode::RateLimitExceeded.is_retryable());

        assert!(!GatewayErrorCode::AuthenticationError.is_retryable());
        assert!(!GatewayErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::network("connection reset");
        assert!(err.to_string().contains("network_error"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn gateway_error_converts_to_domain_error() {
        let err = GatewayError::provider("internal").with_provider_code("api_error");
        let domain_err: DomainError = err.into();
        assert_eq!(domain_err.code, ErrorCode::GatewayUnavailable);
        assert_eq!(
            domain_err.details.get("gateway_code"),
            Some(&"provider_error".to_string())
        );
    }

    #[test]
    fn gateway_error_converts_to_purchase_error() {
        let err = GatewayError::network("timeout");
        let purchase_err: PurchaseError = err.into();
        assert!(purchase_err.is_retryable());
    }
}
