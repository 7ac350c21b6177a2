//! Axum router configuration for payment endpoints.
//!
//! This module defines the route structure for payment-related API endpoints
//! and wires them to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_payment, handle_gateway_webhook, initiate_purchase, list_my_payments, PaymentsAppState,
};

/// Create the payment API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /` - Initiate a purchase
/// - `GET /` - List the requester's payments
/// - `GET /:id` - Check a payment's status (buyer only)
pub fn payment_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/", post(initiate_purchase).get(list_my_payments))
        .route("/:id", get(get_payment))
}

/// Create the gateway webhook router.
///
/// This is separate from the main payment routes because webhooks don't
/// require user authentication (they're verified via signature).
///
/// # Routes
/// - `POST /gateway` - Handle gateway webhooks
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new().route("/gateway", post(handle_gateway_webhook))
}
