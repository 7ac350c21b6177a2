//! Email adapters.
//!
//! Implementations of the `EmailSender` port:
//! - `ResendEmailSender` - Resend HTTP API

mod resend;

pub use resend::ResendEmailSender;
