//! Purchase and reconciliation error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound / LessonNotFound | 404 |
//! | PaymentNotFound | 404 |
//! | UserNotFound | 404 |
//! | DuplicatePurchase | 409 |
//! | AlreadyOwner | 409 |
//! | InvalidState | 409 |
//! | Forbidden | 403 |
//! | ValidationFailed | 400 |
//! | GatewayUnavailable | 502 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{
    CourseId, DomainError, ErrorCode, LessonId, PaymentId, UserId, ValidationError,
};

use super::record::ItemRef;

/// Errors raised while initiating or reconciling purchases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    /// Course does not exist in the catalog.
    CourseNotFound(CourseId),

    /// Lesson does not exist in the catalog.
    LessonNotFound(LessonId),

    /// Payment record was not found.
    PaymentNotFound(PaymentId),

    /// Buyer is unknown.
    UserNotFound(UserId),

    /// A paid or still-pending attempt already exists for this buyer and item.
    DuplicatePurchase { buyer_id: UserId, item: ItemRef },

    /// Buyer owns the item and cannot purchase it.
    AlreadyOwner { user_id: UserId, item: ItemRef },

    /// Buyer's role is not allowed to purchase.
    Forbidden { reason: String },

    /// Operation is not valid for the record's current status.
    InvalidState { current: String, attempted: String },

    /// Input failed validation.
    ValidationFailed { field: String, message: String },

    /// Payment gateway rejected the call or could not be reached.
    GatewayUnavailable { reason: String },

    /// Storage or queue failure.
    Infrastructure(String),
}

impl PurchaseError {
    pub fn course_not_found(id: CourseId) -> Self {
        PurchaseError::CourseNotFound(id)
    }

    pub fn lesson_not_found(id: LessonId) -> Self {
        PurchaseError::LessonNotFound(id)
    }

    pub fn payment_not_found(id: PaymentId) -> Self {
        PurchaseError::PaymentNotFound(id)
    }

    pub fn user_not_found(id: UserId) -> Self {
        PurchaseError::UserNotFound(id)
    }

    pub fn duplicate_purchase(buyer_id: UserId, item: ItemRef) -> Self {
        PurchaseError::DuplicatePurchase { buyer_id, item }
    }

    pub fn already_owner(user_id: UserId, item: ItemRef) -> Self {
        PurchaseError::AlreadyOwner { user_id, item }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        PurchaseError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        PurchaseError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PurchaseError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn gateway_unavailable(reason: impl Into<String>) -> Self {
        PurchaseError::GatewayUnavailable {
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PurchaseError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PurchaseError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            PurchaseError::LessonNotFound(_) => ErrorCode::LessonNotFound,
            PurchaseError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            PurchaseError::UserNotFound(_) => ErrorCode::UserNotFound,
            PurchaseError::DuplicatePurchase { .. } | PurchaseError::AlreadyOwner { .. } => {
                ErrorCode::DuplicatePurchase
            }
            PurchaseError::Forbidden { .. } => ErrorCode::Forbidden,
            PurchaseError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            PurchaseError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PurchaseError::GatewayUnavailable { .. } => ErrorCode::GatewayUnavailable,
            PurchaseError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        match self {
            PurchaseError::CourseNotFound(id) => format!("Course not found: {}", id),
            PurchaseError::LessonNotFound(id) => format!("Lesson not found: {}", id),
            PurchaseError::PaymentNotFound(id) => format!("Payment not found: {}", id),
            PurchaseError::UserNotFound(id) => format!("User not found: {}", id.as_str()),
            PurchaseError::DuplicatePurchase { buyer_id, item } => format!(
                "User {} already has a paid or pending purchase for {}",
                buyer_id.as_str(),
                item
            ),
            PurchaseError::AlreadyOwner { user_id, item } => {
                format!("User {} owns {} and cannot purchase it", user_id.as_str(), item)
            }
            PurchaseError::Forbidden { reason } => format!("Purchase not allowed: {}", reason),
            PurchaseError::InvalidState { current, attempted } => {
                format!("Cannot {} a payment in {} state", attempted, current)
            }
            PurchaseError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PurchaseError::GatewayUnavailable { reason } => {
                format!("Payment gateway unavailable: {}", reason)
            }
            PurchaseError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true when a retry of the same request can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PurchaseError::GatewayUnavailable { .. } | PurchaseError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PurchaseError {}

impl From<ValidationError> for PurchaseError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field } => field.clone(),
            ValidationError::OutOfRange { field, .. } => field.clone(),
            ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        PurchaseError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<PurchaseError> for DomainError {
    fn from(err: PurchaseError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
