//! Foundation module - Shared domain primitives.
//!
//! Value objects, identifiers, and error types that form the vocabulary of
//! the platform: ids, money, timestamps, and the state machine trait.

mod auth;
mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CourseId, LessonId, PaymentId, UserId};
pub use money::{Currency, Money};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
