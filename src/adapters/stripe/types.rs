//! Stripe API object types.
//!
//! These types mirror the subset of Stripe objects the gateway client touches:
//! products, prices, checkout sessions, and the error envelope. They parse
//! actual Stripe JSON and map into the provider-neutral port types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::{SessionPaymentStatus, SessionSnapshot};

/// Stripe Product object (`prod_...`).
///
/// Created once per checkout so the hosted page shows the item name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeProduct {
    /// Unique product identifier.
    pub id: String,

    /// Display name shown on the checkout page.
    pub name: String,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe Price object (`price_...`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    /// Unique price identifier.
    pub id: String,

    /// Product this price belongs to.
    pub product: String,

    /// Amount in minor units (kopecks, cents).
    pub unit_amount: Option<i64>,

    /// Currency code (lowercase, e.g. "rub").
    pub currency: String,
}

/// Stripe Checkout Session object (`cs_...`).
///
/// Shape is shared between the create/retrieve API responses and the
/// `checkout.session.*` webhook payloads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier.
    pub id: String,

    /// Hosted checkout URL. Present while the session is open.
    pub url: Option<String>,

    /// Session status (open, complete, expired).
    #[serde(default)]
    pub status: String,

    /// Payment status (unpaid, paid, no_payment_required).
    #[serde(default)]
    pub payment_status: String,

    /// Customer ID if one was created or attached.
    pub customer: Option<String>,

    /// Email the buyer entered (or was pre-filled with).
    pub customer_email: Option<String>,

    /// Payment intent created once the buyer submits payment.
    pub payment_intent: Option<String>,

    /// Unix timestamp when the session stops accepting payment.
    #[serde(default)]
    pub expires_at: i64,

    /// Custom metadata attached at creation (carries the payment id).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeCheckoutSession {
    /// Collapse Stripe's two status fields into the settlement state.
    ///
    /// An expired session reports `status = "expired"` while keeping
    /// `payment_status = "unpaid"`, so the session status is checked first.
    pub fn settlement_status(&self) -> SessionPaymentStatus {
        if self.status == "expired" {
            return SessionPaymentStatus::Expired;
        }
        match self.payment_status.as_str() {
            "paid" => SessionPaymentStatus::Paid,
            "no_payment_required" => SessionPaymentStatus::NoPaymentRequired,
            _ => SessionPaymentStatus::Unpaid,
        }
    }

    /// Convert into the provider-neutral snapshot used by reconciliation.
    pub fn into_snapshot(self) -> SessionSnapshot {
        let payment_status = self.settlement_status();
        SessionSnapshot {
            id: self.id,
            payment_status,
            payment_intent_id: self.payment_intent,
            customer_id: self.customer,
            metadata: self.metadata,
        }
    }
}

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    /// The error detail object.
    pub error: StripeErrorDetail,
}

/// Stripe error detail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeErrorDetail {
    /// Error category (api_error, card_error, invalid_request_error, ...).
    #[serde(rename = "type")]
    pub error_type: Option<String>,

    /// Machine-readable error code.
    pub code: Option<String>,

    /// Human-readable message.
    pub message: Option<String>,

    /// The request parameter the error relates to.
    pub param: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout Session Parsing
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_open_session() {
        let json = r#"{
            "id": "cs_test_a1b2c3",
            "object": "checkout.session",
            "url": "https://checkout.stripe.com/c/pay/cs_test_a1b2c3",
            "status": "open",
            "payment_status": "unpaid",
            "customer": null,
            "customer_email": "buyer@example.com",
            "payment_intent": null,
            "expires_at": 1704153600,
            "metadata": {
                "payment_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7"
            }
        }"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.id, "cs_test_a1b2c3");
        assert_eq!(session.status, "open");
        assert_eq!(session.payment_status, "unpaid");
        assert!(session.url.is_some());
        assert!(session.payment_intent.is_none());
        assert_eq!(session.expires_at, 1704153600);
        assert_eq!(
            session.metadata.get("payment_id").unwrap(),
            "7c9e6679-7425-40de-944b-e07fc1f90ae7"
        );
    }

    #[test]
    fn parse_completed_session() {
        let json = r#"{
            "id": "cs_test_done",
            "object": "checkout.session",
            "url": null,
            "status": "complete",
            "payment_status": "paid",
            "customer": "cus_abc",
            "payment_intent": "pi_xyz",
            "metadata": {}
        }"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.settlement_status(), SessionPaymentStatus::Paid);
        assert_eq!(session.customer, Some("cus_abc".to_string()));
        assert_eq!(session.payment_intent, Some("pi_xyz".to_string()));
    }

    #[test]
    fn parse_session_with_missing_optional_fields() {
        // Webhook payloads can omit fields the create response includes
        let json = r#"{"id": "cs_min", "payment_status": "paid"}"#;

        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.id, "cs_min");
        assert!(session.metadata.is_empty());
        assert_eq!(session.expires_at, 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Settlement Status Mapping
    // ════════════════════════════════════════════════════════════════════════════

    fn session_with(status: &str, payment_status: &str) -> StripeCheckoutSession {
        StripeCheckoutSession {
            id: "cs_test".to_string(),
            url: None,
            status: status.to_string(),
            payment_status: payment_status.to_string(),
            customer: None,
            customer_email: None,
            payment_intent: None,
            expires_at: 0,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn settlement_status_paid() {
        let session = session_with("complete", "paid");
        assert_eq!(session.settlement_status(), SessionPaymentStatus::Paid);
    }

    #[test]
    fn settlement_status_no_payment_required() {
        let session = session_with("complete", "no_payment_required");
        assert_eq!(
            session.settlement_status(),
            SessionPaymentStatus::NoPaymentRequired
        );
    }

    #[test]
    fn settlement_status_open_unpaid() {
        let session = session_with("open", "unpaid");
        assert_eq!(session.settlement_status(), SessionPaymentStatus::Unpaid);
    }

    #[test]
    fn settlement_status_expired_wins_over_unpaid() {
        // Expired sessions still report payment_status = unpaid
        let session = session_with("expired", "unpaid");
        assert_eq!(session.settlement_status(), SessionPaymentStatus::Expired);
    }

    #[test]
    fn settlement_status_unknown_string_treated_as_unpaid() {
        let session = session_with("open", "something_new");
        assert_eq!(session.settlement_status(), SessionPaymentStatus::Unpaid);
    }

    #[test]
    fn into_snapshot_carries_identifiers() {
        let mut session = session_with("complete", "paid");
        session.payment_intent = Some("pi_123".to_string());
        session.customer = Some("cus_456".to_string());
        session
            .metadata
            .insert("payment_id".to_string(), "some-uuid".to_string());

        let snapshot = session.into_snapshot();

        assert_eq!(snapshot.id, "cs_test");
        assert_eq!(snapshot.payment_status, SessionPaymentStatus::Paid);
        assert_eq!(snapshot.payment_intent_id, Some("pi_123".to_string()));
        assert_eq!(snapshot.customer_id, Some("cus_456".to_string()));
        assert_eq!(snapshot.metadata.get("payment_id").unwrap(), "some-uuid");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Envelope Parsing
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_error_response() {
        let json = r#"{
            "error": {
                "type": "invalid_request_error",
                "code": "parameter_missing",
                "message": "Missing required param: line_items.",
                "param": "line_items"
            }
        }"#;

        let parsed: StripeErrorResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            parsed.error.error_type,
            Some("invalid_request_error".to_string())
        );
        assert_eq!(parsed.error.code, Some("parameter_missing".to_string()));
        assert_eq!(parsed.error.param, Some("line_items".to_string()));
    }

    #[test]
    fn parse_error_response_with_sparse_fields() {
        let json = r#"{"error": {"type": "api_error"}}"#;

        let parsed: StripeErrorResponse = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.error.error_type, Some("api_error".to_string()));
        assert!(parsed.error.code.is_none());
        assert!(parsed.error.message.is_none());
    }

    #[test]
    fn parse_product_and_price() {
        let product: StripeProduct = serde_json::from_str(
            r#"{"id": "prod_abc", "name": "Rust for Beginners", "metadata": {}}"#,
        )
        .unwrap();
        assert_eq!(product.id, "prod_abc");

        let price: StripePrice = serde_json::from_str(
            r#"{"id": "price_xyz", "product": "prod_abc", "unit_amount": 50000, "currency": "rub"}"#,
        )
        .unwrap();
        assert_eq!(price.unit_amount, Some(50000));
        assert_eq!(price.currency, "rub");
    }
}
