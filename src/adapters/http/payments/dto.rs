//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! These types define the JSON request/response structure for the payment API.
//! They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::domain::payment::{ItemRef, PaymentMethod, PaymentRecord, PaymentStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to initiate a purchase.
///
/// Exactly one of `course_id` / `lesson_id` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePurchaseRequest {
    /// Course to purchase.
    #[serde(default)]
    pub course_id: Option<i64>,
    /// Lesson to purchase.
    #[serde(default)]
    pub lesson_id: Option<i64>,
    /// Settlement channel; defaults to the gateway checkout flow.
    #[serde(default)]
    pub method: PaymentMethod,
    /// Email to prefill on the checkout page.
    #[serde(default)]
    pub customer_email: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// The purchased item as `{"kind": "course", "id": 42}`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub kind: &'static str,
    pub id: i64,
}

impl From<&ItemRef> for ItemResponse {
    fn from(item: &ItemRef) -> Self {
        Self {
            kind: item.kind(),
            id: item.raw_id(),
        }
    }
}

/// A payment record as the API exposes it.
///
/// Gateway identifiers stay internal; clients get the lifecycle status and
/// the priced item, nothing more.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: String,
    /// What was bought.
    pub item: ItemResponse,
    /// Price in minor units (kopecks, cents).
    pub amount_minor_units: i64,
    /// Lowercase currency code.
    pub currency: String,
    /// Settlement channel.
    pub method: PaymentMethod,
    /// Current lifecycle status.
    pub status: PaymentStatus,
    /// When the record was opened (ISO 8601).
    pub created_at: String,
    /// Last status change (ISO 8601).
    pub updated_at: String,
}

impl From<&PaymentRecord> for PaymentResponse {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            item: ItemResponse::from(&record.item),
            amount_minor_units: record.amount.minor_units(),
            currency: record.amount.currency().as_str().to_string(),
            method: record.method,
            status: record.status,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Response for an initiated purchase.
///
/// `checkout_url` is null for cash and transfer purchases; those settle
/// out of band.
#[derive(Debug, Clone, Serialize)]
pub struct InitiatePurchaseResponse {
    pub payment: PaymentResponse,
    pub checkout_url: Option<String>,
}

/// Response listing the requester's payments, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
}
