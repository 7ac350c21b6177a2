//! Payment domain module.
//!
//! Owns the purchase lifecycle: record creation, gateway session tracking,
//! webhook verification, and reconciliation to a terminal status.
//!
//! # Module Structure
//!
//! - `record` - PaymentRecord and the items it can reference
//! - `status` - PaymentStatus state machine
//! - `gateway_event` - Typed view of gateway webhook payloads
//! - `reconciler` - Applies gateway events and snapshots to records
//! - `webhook_verifier` - HMAC verification of webhook deliveries
//! - `errors` - PurchaseError taxonomy

mod errors;
mod gateway_event;
mod reconciler;
mod record;
mod status;
mod webhook_verifier;

pub use errors::PurchaseError;
pub use gateway_event::{GatewayEvent, GatewayEventData, GatewayEventType};
pub use reconciler::{ReconcileOutcome, SessionReconciler};
pub use record::{ItemRef, PaymentDraft, PaymentMethod, PaymentRecord};
pub use status::PaymentStatus;
pub use webhook_verifier::{SignatureHeader, WebhookError, WebhookVerifier};

#[cfg(test)]
pub use gateway_event::GatewayEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
