//! Stripe payment gateway adapter.
//!
//! Outbound-only client for creating and retrieving hosted checkout
//! sessions. Inbound webhook verification is a domain concern
//! (`domain::payment::WebhookVerifier`) since it must run before any
//! adapter-level processing.

mod client;
mod types;

pub use client::StripeGatewayClient;
pub use types::{StripeCheckoutSession, StripeErrorResponse, StripePrice, StripeProduct};
