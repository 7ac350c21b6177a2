//! Domain layer - Core business logic.
//!
//! Pure domain types and services with no infrastructure dependencies.
//! Everything the payment lifecycle and platform surfaces need lives here;
//! adapters plug in through the ports layer.

pub mod foundation;
pub mod payment;
pub mod users;
