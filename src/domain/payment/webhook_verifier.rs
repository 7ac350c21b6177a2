//! Webhook signature verification.
//!
//! Inbound gateway notifications are authenticated with an HMAC-SHA256
//! signature over `"{timestamp}.{raw_payload}"` using the shared webhook
//! secret. Verification failures reject the delivery outright; a replay
//! cannot fix a bad signature, so these are never retried.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::gateway_event::GatewayEvent;

/// Maximum allowed event age before a delivery is considered a replay.
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Allowed clock skew for events stamped in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Reasons a webhook delivery is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("Event timestamp is older than {MAX_EVENT_AGE_SECS}s")]
    TimestampTooOld,

    #[error("Event timestamp is more than {MAX_CLOCK_SKEW_SECS}s in the future")]
    TimestampInFuture,

    #[error("Signature does not match payload")]
    SignatureMismatch,

    #[error("Malformed event payload: {0}")]
    MalformedPayload(String),
}

/// Parsed components of the signature header.
///
/// Format: `t=<unix>,v1=<hex>[,v1=<hex>…]` — multiple `v1` entries appear
/// while the gateway rotates signing secrets; any one matching is enough.
/// Unknown scheme keys are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the gateway signed with.
    pub timestamp: i64,
    /// Decoded v1 signatures, at least one.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures: Vec<Vec<u8>> = Vec::new();

        for part in header.split(',') {
            let (key, value) = part.trim().split_once('=').ok_or_else(|| {
                WebhookError::MalformedHeader("expected key=value pairs".to_string())
            })?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::MalformedHeader("timestamp is not an integer".to_string())
                    })?);
                }
                "v1" => {
                    let decoded = hex::decode(value).map_err(|_| {
                        WebhookError::MalformedHeader("v1 signature is not hex".to_string())
                    })?;
                    v1_signatures.push(decoded);
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| WebhookError::MalformedHeader("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::MalformedHeader(
                "missing v1 signature".to_string(),
            ));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifies gateway webhook deliveries against the shared signing secret.
pub struct WebhookVerifier {
    secret: SecretString,
}

impl WebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature over the raw payload and parses the event.
    ///
    /// Steps: parse the header, check the timestamp window, recompute the
    /// HMAC over `"{timestamp}.{payload}"`, compare in constant time against
    /// every presented `v1` signature, then deserialize the payload.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<GatewayEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected = self.compute_signature(header.timestamp, payload);
        let any_match = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !any_match {
            return Err(WebhookError::SignatureMismatch);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let age = chrono::Utc::now().timestamp() - timestamp;
        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampTooOld);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::TimestampInFuture);
        }
        Ok(())
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time byte comparison; never leaks where the mismatch occurs.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a valid hex signature for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
