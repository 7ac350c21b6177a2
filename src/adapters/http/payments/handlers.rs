//! HTTP handlers for payment endpoints.
//!
//! Thin layer: extract, build the command, run the application handler, map
//! the result to a DTO. Authorization beyond "who is asking" lives in the
//! application layer.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::payments::{
    CheckPaymentStatusHandler, CheckPaymentStatusQuery, HandleGatewayWebhookCommand,
    HandleGatewayWebhookHandler, InitiatePurchaseCommand, InitiatePurchaseHandler,
};
use crate::domain::foundation::PaymentId;
use crate::domain::payment::{PurchaseError, SessionReconciler, WebhookVerifier};
use crate::ports::{
    AccessGranter, Authorizer, CatalogStore, PaymentGateway, PaymentStore, WebhookEventStore,
};

use super::dto::{InitiatePurchaseRequest, InitiatePurchaseResponse, PaymentListResponse, PaymentResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the payment endpoints.
///
/// Cloned per request; every dependency is Arc-wrapped.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub payment_store: Arc<dyn PaymentStore>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub authorizer: Arc<dyn Authorizer>,
    pub access_granter: Arc<dyn AccessGranter>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub event_store: Arc<dyn WebhookEventStore>,
    pub reconciler: Arc<SessionReconciler>,
    pub webhook_verifier: Arc<WebhookVerifier>,
}

impl PaymentsAppState {
    /// Create handlers on demand from the shared state.
    pub fn initiate_purchase_handler(&self) -> InitiatePurchaseHandler {
        InitiatePurchaseHandler::new(
            self.payment_store.clone(),
            self.catalog_store.clone(),
            self.authorizer.clone(),
            self.access_granter.clone(),
            self.gateway.clone(),
        )
    }

    pub fn check_payment_status_handler(&self) -> CheckPaymentStatusHandler {
        CheckPaymentStatusHandler::new(
            self.payment_store.clone(),
            self.gateway.clone(),
            self.reconciler.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.event_store.clone(),
            self.reconciler.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - Initiate a purchase
pub async fn initiate_purchase(
    State(state): State<PaymentsAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<InitiatePurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.initiate_purchase_handler();
    let cmd = InitiatePurchaseCommand {
        buyer_id: user.id,
        course_id: request.course_id,
        lesson_id: request.lesson_id,
        method: request.method,
        // Fall back to the token's email for checkout prefill
        customer_email: request.customer_email.or(user.email),
    };

    let result = handler.handle(cmd).await?;

    let response = InitiatePurchaseResponse {
        payment: PaymentResponse::from(&result.payment),
        checkout_url: result.checkout_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/webhooks/gateway - Handle gateway webhook events
pub async fn handle_gateway_webhook(
    State(state): State<PaymentsAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Extract the gateway signature header
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            PurchaseError::validation("Stripe-Signature", "Missing Stripe-Signature header")
        })?;

    let handler = state.webhook_handler();
    let cmd = HandleGatewayWebhookCommand {
        payload: body.to_vec(),
        signature_header: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/payments/:id - Check a payment's status (buyer only)
pub async fn get_payment(
    State(state): State<PaymentsAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.check_payment_status_handler();
    let query = CheckPaymentStatusQuery {
        payment_id: PaymentId::from_uuid(id),
        requester_id: user.id,
    };

    let result = handler.handle(query).await?;

    Ok(Json(PaymentResponse::from(&result.payment)))
}

/// GET /api/payments - List the requester's payments, newest first
pub async fn list_my_payments(
    State(state): State<PaymentsAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.payment_store.list_for_buyer(&user.id).await?;

    let response = PaymentListResponse {
        payments: payments.iter().map(PaymentResponse::from).collect(),
    };

    Ok(Json(response))
}
