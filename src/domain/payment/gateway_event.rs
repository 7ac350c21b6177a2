//! Gateway webhook event types.
//!
//! Parsed form of the signed notifications the payment gateway pushes.
//! Only the fields reconciliation needs are captured; the event payload
//! object stays a raw JSON value because its shape varies per event type.

use serde::{Deserialize, Serialize};

/// A verified webhook event from the payment gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Unique event identifier (`evt_…`), the deduplication key.
    pub id: String,

    /// Raw event type string (e.g. `"checkout.session.completed"`).
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp at which the gateway created the event.
    pub created: i64,

    /// Event-specific payload.
    pub data: GatewayEventData,

    /// Live vs test mode.
    #[serde(default)]
    pub livemode: bool,
}

/// Container for the event payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEventData {
    /// The object the event describes (checkout session, payment intent, …).
    pub object: serde_json::Value,
}

/// Event types the reconciler knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEventType {
    /// Hosted checkout session settled.
    SessionCompleted,
    /// Hosted checkout session timed out unpaid.
    SessionExpired,
    /// Payment intent confirmed (informational; settlement authority stays
    /// with the session).
    PaymentIntentSucceeded,
    /// Payment attempt failed at the processor.
    PaymentIntentFailed,
    /// Anything this version does not handle; kept for forward compatibility.
    Unknown(String),
}

impl GatewayEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::SessionCompleted,
            "checkout.session.expired" => Self::SessionExpired,
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SessionCompleted => "checkout.session.completed",
            Self::SessionExpired => "checkout.session.expired",
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentFailed => "payment_intent.payment_failed",
            Self::Unknown(raw) => raw,
        }
    }
}

impl GatewayEvent {
    /// Parses the raw event type string into the known enum.
    pub fn parsed_type(&self) -> GatewayEventType {
        GatewayEventType::parse(&self.event_type)
    }

    /// True when the payload object is a checkout session.
    pub fn is_session_object(&self) -> bool {
        self.data.object.get("object").and_then(|v| v.as_str()) == Some("checkout.session")
    }

    /// Checkout session id, when the payload object is a session.
    pub fn session_id(&self) -> Option<&str> {
        if self.is_session_object() {
            self.data.object.get("id").and_then(|v| v.as_str())
        } else {
            None
        }
    }

    /// Payment-intent id: the session's `payment_intent` field, or the
    /// object's own id for intent-scoped events.
    pub fn payment_intent_id(&self) -> Option<&str> {
        if self.is_session_object() {
            self.data.object.get("payment_intent").and_then(|v| v.as_str())
        } else {
            self.data.object.get("id").and_then(|v| v.as_str())
        }
    }

    /// Internal payment id echoed back through gateway metadata, if the
    /// session was created with one.
    pub fn metadata_payment_id(&self) -> Option<&str> {
        self.data
            .object
            .get("metadata")
            .and_then(|m| m.get("payment_id"))
            .and_then(|v| v.as_str())
    }
}

/// Builder for test events.
#[cfg(test)]
pub struct GatewayEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for GatewayEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_1".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl GatewayEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    /// A `checkout.session.*` payload with the usual fields.
    pub fn session_object(
        self,
        session_id: &str,
        payment_intent: Option<&str>,
        payment_id: Option<&str>,
    ) -> Self {
        let mut object = serde_json::json!({
            "object": "checkout.session",
            "id": session_id,
            "payment_status": "paid",
        });
        if let Some(intent) = payment_intent {
            object["payment_intent"] = serde_json::json!(intent);
        }
        if let Some(payment_id) = payment_id {
            object["metadata"] = serde_json::json!({ "payment_id": payment_id });
        }
        self.object(object)
    }

    pub fn build(self) -> GatewayEvent {
        GatewayEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: GatewayEventData {
                object: self.object,
            },
            livemode: self.livemode,
        }
    }
}
