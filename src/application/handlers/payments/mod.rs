//! Payment handlers.
//!
//! Command and query handlers for the purchase lifecycle:
//!
//! ## Commands
//! - Initiating a purchase (pending record plus optional checkout session)
//! - Handling gateway webhook deliveries
//!
//! ## Queries
//! - Checking a payment's status, reconciling against the gateway on the way

mod check_payment_status;
mod handle_gateway_webhook;
mod initiate_purchase;

// Commands
pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    WebhookOutcome,
};
pub use initiate_purchase::{InitiatePurchaseCommand, InitiatePurchaseHandler, InitiatePurchaseResult};

// Queries
pub use check_payment_status::{
    CheckPaymentStatusHandler, CheckPaymentStatusQuery, CheckPaymentStatusResult,
};
