//! Shared HTTP error mapping.
//!
//! Every surface speaks [`PurchaseError`], so the status mapping and the JSON
//! error body live in one place instead of per feature.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::domain::payment::PurchaseError;

/// JSON body returned for every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details.
    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Wrapper to implement `IntoResponse` for domain errors.
#[derive(Debug)]
pub struct ApiError(pub PurchaseError);

impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        ApiError(err)
    }
}

impl From<crate::domain::foundation::DomainError> for ApiError {
    fn from(err: crate::domain::foundation::DomainError) -> Self {
        ApiError(PurchaseError::infrastructure(err.message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            PurchaseError::CourseNotFound(_)
            | PurchaseError::LessonNotFound(_)
            | PurchaseError::PaymentNotFound(_)
            | PurchaseError::UserNotFound(_) => StatusCode::NOT_FOUND,
            PurchaseError::DuplicatePurchase { .. }
            | PurchaseError::AlreadyOwner { .. }
            | PurchaseError::InvalidState { .. } => StatusCode::CONFLICT,
            PurchaseError::Forbidden { .. } => StatusCode::FORBIDDEN,
            PurchaseError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            PurchaseError::GatewayUnavailable { .. } => StatusCode::BAD_GATEWAY,
            PurchaseError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
