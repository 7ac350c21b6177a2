//! HTTP adapter for payment endpoints.
//!
//! Exposes the purchase lifecycle via REST API:
//! - `POST /api/payments` - Initiate a purchase
//! - `GET /api/payments` - List the requester's payments
//! - `GET /api/payments/:id` - Check a payment's status (buyer only)
//! - `POST /api/webhooks/gateway` - Handle gateway webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{InitiatePurchaseResponse, PaymentListResponse, PaymentResponse};
pub use handlers::PaymentsAppState;
pub use routes::{payment_routes, webhook_routes};
